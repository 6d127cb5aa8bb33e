//! Framework-independent HTTP surface for the user service.
//!
//! # Responsibility
//! - Resolve request paths to routes without a path-parameter router.
//! - Decode JSON bodies, invoke the repository and encode JSON responses.
//! - Map every failure to a status code and a JSON error payload.
//!
//! # Invariants
//! - Handlers depend only on `dyn UserRepository`, never on a backend.
//! - Storage failure details are logged, not returned to clients.

pub mod handler;
pub mod response;
pub mod route;
