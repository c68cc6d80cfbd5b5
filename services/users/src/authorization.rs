//! Role, ownership and account-state rules for protected routes

use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::Claims,
    models::User,
};

pub const NOT_ADMIN: &str = "Unauthorized";
pub const NOT_OWNER: &str = "Operation not permitted on another user's account";
pub const INACTIVE: &str = "Currently inactive. Activate to perform operation";

/// Only administrators pass
pub fn require_admin(claims: &Claims) -> ApiResult<()> {
    if !claims.is_admin {
        warn!(user_id = %claims.id, "admin-only operation refused");
        return Err(ApiError::forbidden(NOT_ADMIN));
    }
    Ok(())
}

/// The token must belong to the account addressed by the route
pub fn require_owner(claims: &Claims, target: Uuid) -> ApiResult<()> {
    if claims.id != target {
        warn!(user_id = %claims.id, target = %target, "operation on another user's account refused");
        return Err(ApiError::forbidden(NOT_OWNER));
    }
    Ok(())
}

/// The addressed account must currently be active
///
/// Checked against the stored user, not the token, so a token issued before
/// deactivation cannot bypass it.
pub fn require_active(target: &User) -> ApiResult<()> {
    if !target.is_active {
        return Err(ApiError::forbidden(INACTIVE));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(id: Uuid, is_admin: bool) -> Claims {
        Claims {
            id,
            username: "KniteDeveloper".into(),
            is_active: true,
            is_admin,
            iat: 0,
            exp: 0,
        }
    }

    fn user(is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "KniteDeveloper".into(),
            email: "knite@example.com".into(),
            password_hash: "hash".into(),
            is_active,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_rule() {
        assert!(require_admin(&claims(Uuid::new_v4(), true)).is_ok());

        let err = require_admin(&claims(Uuid::new_v4(), false)).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == NOT_ADMIN));
    }

    #[test]
    fn owner_rule() {
        let id = Uuid::new_v4();
        assert!(require_owner(&claims(id, false), id).is_ok());

        let err = require_owner(&claims(id, true), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == NOT_OWNER));
    }

    #[test]
    fn active_rule_uses_stored_state() {
        assert!(require_active(&user(true)).is_ok());

        let err = require_active(&user(false)).unwrap_err();
        assert_eq!(err.to_string(), INACTIVE);
    }
}
