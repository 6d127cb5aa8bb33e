//! In-memory user repository.
//!
//! # Responsibility
//! - Keep users in a process-resident map for tests and ephemeral runs.
//!
//! # Invariants
//! - One mutex guards both the map and the id counter; every operation holds
//!   it for its whole duration, reads included.
//! - Ids start at 1 and are never reused, even after deletion.
//! - Email uniqueness is not enforced here.

use crate::context::RequestContext;
use crate::model::user::{User, UserId, UserInput};
use crate::repo::{RepoError, RepoResult, UserRepository};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct MemoryState {
    users: HashMap<UserId, User>,
    next_id: UserId,
}

/// Mutex-guarded in-memory user repository.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                users: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    // Every mutation is a single map/counter step, so a poisoned guard never
    // exposes half-written state.
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create_user(&self, ctx: &RequestContext, input: &UserInput) -> RepoResult<User> {
        let input = input.normalized()?;
        let mut state = self.lock();
        ctx.check()?;

        let user = User::from_input(state.next_id, input);
        state.users.insert(user.id, user.clone());
        state.next_id += 1;

        Ok(user)
    }

    fn list_users(&self, ctx: &RequestContext) -> RepoResult<Vec<User>> {
        let state = self.lock();
        ctx.check()?;

        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    fn get_user(&self, ctx: &RequestContext, id: UserId) -> RepoResult<User> {
        let state = self.lock();
        ctx.check()?;

        state.users.get(&id).cloned().ok_or(RepoError::NotFound(id))
    }

    fn update_user(
        &self,
        ctx: &RequestContext,
        id: UserId,
        input: &UserInput,
    ) -> RepoResult<User> {
        let mut state = self.lock();
        ctx.check()?;

        let slot = state.users.get_mut(&id).ok_or(RepoError::NotFound(id))?;
        let input = input.normalized()?;
        *slot = User::from_input(id, input);
        Ok(slot.clone())
    }

    fn delete_user(&self, ctx: &RequestContext, id: UserId) -> RepoResult<()> {
        let mut state = self.lock();
        ctx.check()?;

        state
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }
}
