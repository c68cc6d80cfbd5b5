//! Input validation pipeline
//!
//! Checks run in a fixed order and stop at the first failing stage:
//! required fields, empty fields, username format, email format, uniqueness,
//! password strength. Update requests only re-run the format and uniqueness
//! stages for the fields they actually carry.

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, EMAIL_TAKEN, USERNAME_TAKEN},
    models::{ActivationRequest, LoginRequest, RegisterRequest, UpdateRequest, UpdateUser},
    repositories::UserStore,
};

pub const INVALID_USERNAME: &str = "Username is invalid";
pub const TWO_CHAR_USERNAME: &str = "A two-character username must have only letters";
pub const SHORT_USERNAME: &str = "Username must be at least two characters";
pub const INVALID_EMAIL: &str = "The email address provided is invalid";
pub const WEAK_PASSWORD: &str =
    "The password failed to match the required pattern: 8 to 128 characters with at least one letter";
pub const WRONG_TRANSITION: &str = "Paramaters are incorrect. Try again.";

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Trimmed registration fields that passed every stage
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Trimmed login fields
#[derive(Debug, Clone, PartialEq)]
pub struct ValidLogin {
    pub identifier: String,
    pub password: String,
}

/// Stage 1: every field must be present
fn require_present<'a, const N: usize>(
    fields: [(&'static str, Option<&'a str>); N],
) -> ApiResult<[(&'static str, &'a str); N]> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| format!("{name} is required"))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::Validation(missing));
    }

    Ok(fields.map(|(name, value)| (name, value.unwrap_or_default().trim())))
}

/// Stage 2: no present field may be blank
fn require_non_empty(fields: &[(&'static str, &str)]) -> ApiResult<()> {
    let empty: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| format!("{name} cannot be empty"))
        .collect();
    if !empty.is_empty() {
        return Err(ApiError::Validation(empty));
    }
    Ok(())
}

/// Stage 3
pub fn validate_username(username: &str) -> ApiResult<()> {
    let length = username.chars().count();
    if length < 2 {
        return Err(ApiError::bad_request(SHORT_USERNAME));
    }
    if length == 2 && !username.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::bad_request(TWO_CHAR_USERNAME));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("Failed to compile username regex")
    });
    if !regex.is_match(username) {
        return Err(ApiError::bad_request(INVALID_USERNAME));
    }

    Ok(())
}

/// Stage 4
pub fn validate_email(email: &str) -> ApiResult<()> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if email.len() > 254 || !regex.is_match(email) {
        return Err(ApiError::bad_request(INVALID_EMAIL));
    }
    Ok(())
}

/// Stage 5: usernames and emails may not belong to another account
///
/// `owner` is the account being updated, whose own values never clash. The
/// probe is not atomic with the later write; the store's constraints remain
/// the final word.
pub async fn ensure_available(
    store: &dyn UserStore,
    username: Option<&str>,
    email: Option<&str>,
    owner: Option<Uuid>,
) -> ApiResult<()> {
    let taken_by_other = |found: Option<crate::models::User>| {
        found.is_some_and(|user| Some(user.id) != owner)
    };

    if let Some(username) = username {
        if taken_by_other(store.find_by_username(username).await?) {
            return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
        }
    }
    if let Some(email) = email {
        if taken_by_other(store.find_by_email(email).await?) {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }
    }
    Ok(())
}

/// Stage 6: 8 to 128 characters including at least one letter
pub fn validate_password(password: &str) -> ApiResult<()> {
    let length = password.chars().count();
    let has_letter = password.chars().any(char::is_alphabetic);

    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&length) || !has_letter {
        return Err(ApiError::bad_request(WEAK_PASSWORD));
    }
    Ok(())
}

/// Full pipeline for `POST /register`
pub async fn validate_registration(
    store: &dyn UserStore,
    request: &RegisterRequest,
) -> ApiResult<ValidRegistration> {
    let fields = require_present([
        ("username", request.username.as_deref()),
        ("email", request.email.as_deref()),
        ("password", request.password.as_deref()),
    ])?;
    require_non_empty(&fields)?;
    let [(_, username), (_, email), (_, password)] = fields;

    validate_username(username)?;
    validate_email(email)?;
    ensure_available(store, Some(username), Some(email), None).await?;
    validate_password(password)?;

    Ok(ValidRegistration {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Presence checks for `POST /login`
pub fn validate_login(request: &LoginRequest) -> ApiResult<ValidLogin> {
    let fields = require_present([
        ("identifier", request.identifier.as_deref()),
        ("password", request.password.as_deref()),
    ])?;
    require_non_empty(&fields)?;
    let [(_, identifier), (_, password)] = fields;

    Ok(ValidLogin {
        identifier: identifier.to_string(),
        password: password.to_string(),
    })
}

/// Partial pipeline for `PATCH /:id`
///
/// Absent or blank fields are dropped from the resulting change set.
pub async fn validate_update(
    store: &dyn UserStore,
    owner: Uuid,
    request: &UpdateRequest,
) -> ApiResult<UpdateUser> {
    let provided = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let username = provided(&request.username);
    let email = provided(&request.email);

    if let Some(username) = &username {
        validate_username(username)?;
    }
    if let Some(email) = &email {
        validate_email(email)?;
    }
    ensure_available(store, username.as_deref(), email.as_deref(), Some(owner)).await?;

    Ok(UpdateUser {
        username,
        email,
        is_active: None,
    })
}

/// The body of an activation route must name the state being moved to
pub fn validate_transition(request: &ActivationRequest, target_state: bool) -> ApiResult<()> {
    match request.is_active.as_ref().and_then(|flag| flag.as_bool()) {
        Some(requested) if requested == target_state => Ok(()),
        _ => Err(ApiError::forbidden(WRONG_TRANSITION)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{ActiveFlag, NewUser},
        repositories::InMemoryUserRepository,
    };

    fn message(err: ApiError) -> String {
        err.to_string()
    }

    fn register(username: Option<&str>, email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.map(str::to_string),
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    async fn seeded_store() -> (InMemoryUserRepository, Uuid) {
        let store = InMemoryUserRepository::new();
        let user = store
            .create(NewUser::new(
                "KniteDeveloper".into(),
                "knite@example.com".into(),
                "hash".into(),
            ))
            .await
            .unwrap();
        (store, user.id)
    }

    #[test]
    fn username_rules() {
        assert_eq!(message(validate_username("123thomas").unwrap_err()), INVALID_USERNAME);
        assert_eq!(message(validate_username("34").unwrap_err()), TWO_CHAR_USERNAME);
        assert_eq!(message(validate_username("a").unwrap_err()), SHORT_USERNAME);
        assert_eq!(message(validate_username("knite dev").unwrap_err()), INVALID_USERNAME);
        assert!(validate_username("ab").is_ok());
        assert!(validate_username("KniteDeveloper_2").is_ok());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("knite@example.com").is_ok());
        assert_eq!(message(validate_email("voluptas").unwrap_err()), INVALID_EMAIL);
        assert!(validate_email("knite@example").is_err());
        assert!(validate_email("knite@@example.com").is_err());
        assert!(validate_email("knite@example..com").is_err());
        assert!(validate_email("knite@.example.com").is_err());
        assert!(validate_email("knite@mail.example.co").is_ok());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("regularPassword").is_ok());
        assert!(validate_password("s3cretpass").is_ok());
        assert_eq!(message(validate_password("-45.1234").unwrap_err()), WEAK_PASSWORD);
        assert!(validate_password("abc12").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
        assert!(message(validate_password("12345678").unwrap_err()).contains("The password failed to match"));
    }

    #[tokio::test]
    async fn missing_fields_are_listed_in_order() {
        let store = InMemoryUserRepository::new();
        let err = validate_registration(&store, &RegisterRequest::default())
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(messages) => assert_eq!(
                messages,
                ["username is required", "email is required", "password is required"]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_fields_are_listed_in_order() {
        let store = InMemoryUserRepository::new();
        let err = validate_registration(&store, &register(Some(""), Some("  "), Some("")))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(messages) => assert_eq!(
                messages,
                ["username cannot be empty", "email cannot be empty", "password cannot be empty"]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn required_stage_runs_before_empty_stage() {
        let store = InMemoryUserRepository::new();
        let err = validate_registration(&store, &register(Some(""), None, Some("")))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(messages) => assert_eq!(messages, ["email is required"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn registration_trims_fields() {
        let store = InMemoryUserRepository::new();
        let valid = validate_registration(
            &store,
            &register(Some("  melody "), Some(" melody@example.com"), Some(" tunefulPass ")),
        )
        .await
        .unwrap();

        assert_eq!(valid.username, "melody");
        assert_eq!(valid.email, "melody@example.com");
        assert_eq!(valid.password, "tunefulPass");
    }

    #[tokio::test]
    async fn uniqueness_is_checked_before_password_strength() {
        let (store, _) = seeded_store().await;

        let err = validate_registration(
            &store,
            &register(Some("KniteDeveloper"), Some("new@example.com"), Some("1")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == USERNAME_TAKEN));

        let err = validate_registration(
            &store,
            &register(Some("Fresh"), Some("knite@example.com"), Some("regularPassword")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == EMAIL_TAKEN));
    }

    #[tokio::test]
    async fn update_only_checks_provided_fields() {
        let (store, owner) = seeded_store().await;

        let request = UpdateRequest {
            username: Some("   ".into()),
            email: Some(" tune@example.com ".into()),
        };
        let changes = validate_update(&store, owner, &request).await.unwrap();
        assert_eq!(changes.username, None);
        assert_eq!(changes.email.as_deref(), Some("tune@example.com"));

        let request = UpdateRequest {
            username: Some("34".into()),
            email: None,
        };
        let err = validate_update(&store, owner, &request).await.unwrap_err();
        assert_eq!(message(err), TWO_CHAR_USERNAME);
    }

    #[tokio::test]
    async fn update_may_keep_own_username_but_not_take_another() {
        let (store, owner) = seeded_store().await;
        let request = UpdateRequest {
            username: Some("KniteDeveloper".into()),
            email: None,
        };
        assert!(validate_update(&store, owner, &request).await.is_ok());

        let err = validate_update(&store, Uuid::new_v4(), &request).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn login_requires_identifier_and_password() {
        let err = validate_login(&LoginRequest::default()).unwrap_err();
        match err {
            ApiError::Validation(messages) => {
                assert_eq!(messages, ["identifier is required", "password is required"])
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let valid = validate_login(&LoginRequest {
            identifier: Some(" KniteDeveloper ".into()),
            password: Some("regularPassword ".into()),
        })
        .unwrap();
        assert_eq!(valid.identifier, "KniteDeveloper");
        assert_eq!(valid.password, "regularPassword");
    }

    #[test]
    fn transition_must_match_direction() {
        let body = |flag: Option<ActiveFlag>| ActivationRequest { is_active: flag };

        assert!(validate_transition(&body(Some(ActiveFlag::Text("false".into()))), false).is_ok());
        assert!(validate_transition(&body(Some(ActiveFlag::Bool(true))), true).is_ok());

        let err = validate_transition(&body(Some(ActiveFlag::Text("true".into()))), false).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == WRONG_TRANSITION));
        assert!(validate_transition(&body(None), true).is_err());
    }
}
