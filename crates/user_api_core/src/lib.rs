//! Core domain logic for the user service.
//! This crate is the single source of truth for user invariants, the
//! repository contract and its HTTP mapping.

pub mod api;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use api::handler::UserHandler;
pub use api::response::{ApiError, ApiResponse};
pub use context::{CancellationToken, RequestContext};
pub use logging::{default_log_level, init_logging};
pub use model::user::{User, UserId, UserInput, UserValidationError};
pub use repo::memory_repo::InMemoryUserRepository;
pub use repo::sqlite_repo::SqliteUserRepository;
pub use repo::{RepoError, RepoResult, UserRepository};
