//! Persistence collaborator for user accounts
//!
//! [`UserStore`] is what the lifecycle service talks to. The store enforces
//! uniqueness of usernames and emails itself and reports clashes as
//! [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, UpdateUser, User};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserRepository;
pub use user::PgUserRepository;

/// Column guarded by a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

/// Errors raised by a [`UserStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD access to user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user, assigning its id and timestamps
    async fn create(&self, new_user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Exact, case-sensitive match on either username or email
    async fn find_by_identifier(&self, identifier: &str) -> StoreResult<Option<User>>;

    /// All users, oldest first
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Apply a partial update; `None` when the user does not exist
    async fn update(&self, id: Uuid, changes: UpdateUser) -> StoreResult<Option<User>>;

    /// Remove a user; `false` when there was nothing to remove
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
