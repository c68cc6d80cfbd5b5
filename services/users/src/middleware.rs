//! Token authentication middleware and request extractors

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    jwt::Claims,
    models::User,
    state::AppState,
};

pub const INVALID_ID: &str = "Invalid uuid user id param";
pub const MALFORMED_BODY: &str = "Malformed request body";

/// Decode the token in the `Authorization` header and stash its claims
///
/// The header carries the raw token; a `Bearer ` prefix is tolerated.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map(str::trim))
        .transpose()
        .map_err(|_| ApiError::InvalidToken)?
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingToken)?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);

    let claims = state.jwt_service.verify(token).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        ApiError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Claims of the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or(ApiError::MissingToken)
    }
}

/// The existing user addressed by the `:id` route parameter
#[derive(Debug, Clone)]
pub struct TargetUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for TargetUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request(INVALID_ID))?;
        let id = Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(INVALID_ID))?;

        let user = state.user_service.get(id).await?;
        Ok(TargetUser(user))
    }
}

/// JSON body where an empty body reads as `T::default()`
///
/// Lets the validation pipeline report every missing field when a client
/// sends nothing at all.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| ApiError::bad_request(MALFORMED_BODY))?;

        parse_json(&bytes).map(JsonBody)
    }
}

/// Decode a JSON body read earlier as raw bytes
///
/// Handlers guarded by ownership rules take the body as `Bytes` and decode it
/// with this once the guards pass.
pub fn parse_json<T>(bytes: &[u8]) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(bytes).map_err(|e| {
        debug!(error = %e, "rejected request body");
        ApiError::bad_request(MALFORMED_BODY)
    })
}
