//! Domain model for the user service.
//!
//! # Responsibility
//! - Define the canonical user record shared by storage and HTTP layers.
//! - Own write-side normalization and validation rules.
//!
//! # Invariants
//! - Every stored user is identified by a store-assigned `UserId`.
//! - Stored `name` and `email` are trimmed and non-empty.

pub mod user;
