//! Request bodies accepted by the user routes
//!
//! Every field is optional so that a missing field and an empty one can be
//! reported differently by the validation pipeline.

use serde::Deserialize;

/// Registration body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login body; `identifier` is either a username or an email
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// Profile update body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Activation or deactivation body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivationRequest {
    #[serde(rename = "isActive")]
    pub is_active: Option<ActiveFlag>,
}

/// `isActive` as sent by clients: a JSON boolean or its string spelling
///
/// Any other JSON value is kept as `Other` and never names a state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActiveFlag {
    Bool(bool),
    Text(String),
    Other(serde_json::Value),
}

impl ActiveFlag {
    /// The boolean this flag spells, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ActiveFlag::Bool(value) => Some(*value),
            ActiveFlag::Text(text) => match text.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            ActiveFlag::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_fields_stay_distinct() {
        let body: RegisterRequest =
            serde_json::from_str(r#"{"username": "", "password": "secret"}"#).unwrap();
        assert_eq!(body.username.as_deref(), Some(""));
        assert_eq!(body.email, None);
        assert_eq!(body.password.as_deref(), Some("secret"));
    }

    #[test]
    fn active_flag_accepts_booleans_and_strings() {
        let parse = |raw: &str| -> Option<bool> {
            let body: ActivationRequest = serde_json::from_str(raw).unwrap();
            body.is_active.and_then(|flag| flag.as_bool())
        };

        assert_eq!(parse(r#"{"isActive": false}"#), Some(false));
        assert_eq!(parse(r#"{"isActive": "true"}"#), Some(true));
        assert_eq!(parse(r#"{"isActive": "yes"}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn active_flag_tolerates_other_json_values() {
        for raw in [r#"{"isActive": 1}"#, r#"{"isActive": {}}"#, r#"{"isActive": [true]}"#] {
            let body: ActivationRequest = serde_json::from_str(raw).unwrap();
            assert!(matches!(body.is_active, Some(ActiveFlag::Other(_))), "{raw}");
            assert_eq!(body.is_active.and_then(|flag| flag.as_bool()), None);
        }
    }
}
