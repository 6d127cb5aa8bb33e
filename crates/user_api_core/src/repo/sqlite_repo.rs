//! User repository contracts backed by SQLite.
//!
//! # Responsibility
//! - Translate user CRUD into parameterized statements on the `users` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Each write is one autocommit statement on a mutex-guarded connection.
//! - Update looks the id up under the same guard before validating input, so
//!   an absent id reports `NotFound` ahead of `Validation`.
//! - Zero affected rows on update/delete means the id does not exist.
//! - Constraint violations (duplicate email) surface as `RepoError::Db`.

use crate::context::RequestContext;
use crate::db::schema::{schema_version, SCHEMA_VERSION};
use crate::model::user::{User, UserId, UserInput};
use crate::repo::{RepoError, RepoResult, UserRepository};
use log::warn;
use rusqlite::{params, Connection, Row};
use std::sync::{Mutex, MutexGuard, PoisonError};

const USER_SELECT_SQL: &str = "SELECT id, name, email FROM users";

/// SQLite-backed user repository owning its connection.
pub struct SqliteUserRepository {
    conn: Mutex<Connection>,
}

impl SqliteUserRepository {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema has not been set up.
    /// - `MissingRequiredTable("users")` when the schema lacks the table.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let expected_version = SCHEMA_VERSION;
        let actual_version = schema_version(&conn)?;
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_users_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'users'
            );",
            [],
            |row| row.get(0),
        )?;
        if !has_users_table {
            return Err(RepoError::MissingRequiredTable("users"));
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // Statements are autocommit; a poisoned guard never holds an open transaction.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserRepository for SqliteUserRepository {
    fn create_user(&self, ctx: &RequestContext, input: &UserInput) -> RepoResult<User> {
        let input = input.normalized()?;
        let conn = self.lock();
        ctx.check()?;

        if let Err(err) = conn.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2);",
            params![input.name.as_str(), input.email.as_str()],
        ) {
            warn!("event=user_create module=repo status=error backend=sqlite error={}", err);
            return Err(err.into());
        }

        Ok(User::from_input(conn.last_insert_rowid(), input))
    }

    fn list_users(&self, ctx: &RequestContext) -> RepoResult<Vec<User>> {
        let conn = self.lock();
        ctx.check()?;

        let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();

        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn get_user(&self, ctx: &RequestContext, id: UserId) -> RepoResult<User> {
        let conn = self.lock();
        ctx.check()?;

        let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_user_row(row);
        }

        Err(RepoError::NotFound(id))
    }

    fn update_user(
        &self,
        ctx: &RequestContext,
        id: UserId,
        input: &UserInput,
    ) -> RepoResult<User> {
        let conn = self.lock();
        ctx.check()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::NotFound(id));
        }

        let input = input.normalized()?;
        let changed = conn.execute(
            "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3;",
            params![input.name.as_str(), input.email.as_str(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(User::from_input(id, input))
    }

    fn delete_user(&self, ctx: &RequestContext, id: UserId) -> RepoResult<()> {
        let conn = self.lock();
        ctx.check()?;

        let changed = conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    };

    if user.name.trim().is_empty() || user.email.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "user {} has an empty name or email",
            user.id
        )));
    }

    Ok(user)
}
