//! Path-based route resolution.

use crate::model::user::UserId;

pub const HEALTH_PATH: &str = "/health";
pub const USERS_PATH: &str = "/users";

/// Resolved route. Item ids stay raw until the method has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Health,
    Users,
    User(&'a str),
}

impl<'a> Route<'a> {
    /// Returns `None` for paths outside the service surface.
    pub fn resolve(path: &'a str) -> Option<Self> {
        if path == HEALTH_PATH {
            return Some(Self::Health);
        }
        if path == USERS_PATH {
            return Some(Self::Users);
        }

        path.strip_prefix(USERS_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(Self::User)
    }

    /// Value for the `Allow` header of this route.
    pub fn allowed_methods(&self) -> &'static str {
        match self {
            Self::Health => "GET",
            Self::Users => "GET, POST",
            Self::User(_) => "GET, PUT, DELETE",
        }
    }
}

/// Reasons an item path segment is not a usable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Missing,
    NotNumeric(String),
}

/// Parses the raw `{id}` segment of `/users/{id}`.
pub fn parse_user_id(raw: &str) -> Result<UserId, IdError> {
    if raw.is_empty() {
        return Err(IdError::Missing);
    }
    raw.parse::<UserId>().map_err(|_| IdError::NotNumeric(raw.to_string()))
}
