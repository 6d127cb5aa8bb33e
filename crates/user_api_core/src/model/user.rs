//! User domain model.
//!
//! # Responsibility
//! - Define the stored `User` record and the `UserInput` write payload.
//! - Normalize and validate write payloads before persistence.
//!
//! # Invariants
//! - `id` is assigned by the repository and never changes afterwards.
//! - `name` and `email` are stored without surrounding whitespace.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned user identifier.
///
/// Kept as `i64` to match SQLite `INTEGER PRIMARY KEY` rowids.
pub type UserId = i64;

/// Canonical user record as persisted and returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    /// Builds a stored record from an id and an already normalized input.
    pub fn from_input(id: UserId, input: UserInput) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
        }
    }
}

/// Write payload for create and update operations.
///
/// Missing JSON fields decode as empty strings so they surface as validation
/// failures instead of decode failures. Unknown fields (including `id`) are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns a trimmed copy of this input, or the first validation failure.
    ///
    /// # Errors
    /// - `UserValidationError::EmptyName` when `name` is blank.
    /// - `UserValidationError::EmptyEmail` when `email` is blank.
    pub fn normalized(&self) -> Result<UserInput, UserValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        Ok(UserInput {
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Validation failures for user write payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyEmail,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::EmptyEmail => write!(f, "email is required"),
        }
    }
}

impl Error for UserValidationError {}
