//! In-process user store
//!
//! Backs the service when no database is configured and drives the test
//! suites. It enforces the same unique constraints as the `users` table.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UniqueField, UserStore};
use crate::models::{NewUser, UpdateUser, User};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// First unique field the given values collide on, ignoring the row `skip`
fn clash(
    users: &[User],
    skip: Option<Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> Option<UniqueField> {
    let others = || users.iter().filter(move |u| Some(u.id) != skip);

    if let Some(username) = username {
        if others().any(|u| u.username == username) {
            return Some(UniqueField::Username);
        }
    }
    if let Some(email) = email {
        if others().any(|u| u.email == email) {
            return Some(UniqueField::Email);
        }
    }
    None
}

#[async_trait]
impl UserStore for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if let Some(field) = clash(&users, None, Some(&new_user.username), Some(&new_user.email)) {
            return Err(StoreError::UniqueViolation(field));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            is_active: new_user.is_active,
            is_admin: new_user.is_admin,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(field) = clash(
            &users,
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        ) {
            return Err(StoreError::UniqueViolation(field));
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}
