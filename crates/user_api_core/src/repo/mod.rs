//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage-agnostic user CRUD contract.
//! - Provide in-memory and SQLite implementations of that contract.
//!
//! # Invariants
//! - Write paths normalize and validate input before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`) in
//!   addition to storage transport errors.
//! - Every operation checks its `RequestContext` before touching storage.

use crate::context::RequestContext;
use crate::db::DbError;
use crate::model::user::{User, UserId, UserInput, UserValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_repo;
pub mod sqlite_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every backend.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    NotFound(UserId),
    Db(DbError),
    InvalidData(String),
    Cancelled,
    DeadlineExceeded,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Whether this failure originates in the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Db(_)
                | Self::InvalidData(_)
                | Self::UninitializedConnection { .. }
                | Self::MissingRequiredTable(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::DeadlineExceeded => write!(f, "request deadline exceeded"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user CRUD operations.
///
/// Implementations are shared across request tasks, hence `Send + Sync`.
pub trait UserRepository: Send + Sync {
    /// Persists a new user and returns it with its assigned id.
    fn create_user(&self, ctx: &RequestContext, input: &UserInput) -> RepoResult<User>;
    /// Returns every stored user.
    fn list_users(&self, ctx: &RequestContext) -> RepoResult<Vec<User>>;
    fn get_user(&self, ctx: &RequestContext, id: UserId) -> RepoResult<User>;
    /// Replaces name and email of an existing user, keeping its id.
    ///
    /// An absent id is reported as `NotFound` before the input is validated.
    fn update_user(
        &self,
        ctx: &RequestContext,
        id: UserId,
        input: &UserInput,
    ) -> RepoResult<User>;
    fn delete_user(&self, ctx: &RequestContext, id: UserId) -> RepoResult<()>;
}
