//! User lifecycle: registration, login, reads, updates, activation, deletion
//!
//! Handlers run the authorization rules first; the operations here validate
//! their own input and talk to the store.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::JwtService,
    models::{
        ActivationRequest, LoginRequest, NewUser, RegisterRequest, UpdateRequest, UpdateUser, User,
    },
    password::{hash_password, verify_password},
    repositories::UserStore,
    validation,
};

pub const UNKNOWN_IDENTIFIER: &str = "Incorrect login Credentials";
pub const WRONG_PASSWORD: &str = "Invalid credentials";

/// A user together with a freshly issued token
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Result of a login attempt that got past credential checks
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success(Authenticated),
    /// Credentials were right but the account must be reactivated first
    Inactive { user_id: Uuid },
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    jwt: JwtService,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Authenticated> {
        let valid = validation::validate_registration(self.store(), request).await?;

        let password_hash = hash_password(&valid.password)?;
        let user = self
            .store
            .create(NewUser::new(valid.username, valid.email, password_hash))
            .await?;
        let token = self.jwt.issue(&user)?;

        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(Authenticated { user, token })
    }

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginOutcome> {
        let credentials = validation::validate_login(request)?;

        let Some(user) = self.store.find_by_identifier(&credentials.identifier).await? else {
            warn!(identifier = %credentials.identifier, "login with unknown identifier");
            return Err(ApiError::InvalidCredentials(UNKNOWN_IDENTIFIER.to_string()));
        };

        if !verify_password(&credentials.password, &user.password_hash) {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(ApiError::InvalidCredentials(WRONG_PASSWORD.to_string()));
        }

        if !user.is_active {
            info!(user_id = %user.id, "inactive user logged in, redirecting to activation");
            return Ok(LoginOutcome::Inactive { user_id: user.id });
        }

        let token = self.jwt.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome::Success(Authenticated { user, token }))
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self) -> ApiResult<Vec<User>> {
        Ok(self.store.list().await?)
    }

    pub async fn update(&self, target: &User, request: &UpdateRequest) -> ApiResult<User> {
        let changes = validation::validate_update(self.store(), target.id, request).await?;
        if changes.is_empty() {
            return Ok(target.clone());
        }

        let user = self.apply(target.id, changes).await?;
        info!(user_id = %user.id, "user details updated");
        Ok(user)
    }

    /// Move an account to `active`, re-issuing its token with the new state
    pub async fn set_active(
        &self,
        target: &User,
        request: &ActivationRequest,
        active: bool,
    ) -> ApiResult<Authenticated> {
        validation::validate_transition(request, active)?;

        let changes = UpdateUser {
            is_active: Some(active),
            ..Default::default()
        };
        let user = self.apply(target.id, changes).await?;
        let token = self.jwt.issue(&user)?;

        info!(user_id = %user.id, active, "account activation state changed");
        Ok(Authenticated { user, token })
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn apply(&self, id: Uuid, changes: UpdateUser) -> ApiResult<User> {
        self.store
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

pub fn not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::NotFound(format!("No user with id {id}"))
}
