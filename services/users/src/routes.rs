//! User service routes

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header::LOCATION},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::{
    authorization::{require_active, require_admin, require_owner},
    error::{ApiError, ApiResult},
    middleware::{AuthClaims, JsonBody, TargetUser, auth_middleware, parse_json},
    models::{ActivationRequest, LoginRequest, PublicUser, RegisterRequest, UpdateRequest},
    service::{Authenticated, LoginOutcome},
    state::AppState,
};

pub const BASE_PATH: &str = "/api/user";
pub const LOGIN_MESSAGE: &str = "Login Successful! Token expires in one hour.";

/// Public fields plus the token issued with them
#[derive(Serialize)]
struct TokenResponse {
    #[serde(flatten)]
    user: PublicUser,
    token: String,
}

impl From<Authenticated> for TokenResponse {
    fn from(auth: Authenticated) -> Self {
        Self {
            user: PublicUser::from(&auth.user),
            token: auth.token,
        }
    }
}

/// Create the router for the user service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/allUsers", get(get_all_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/activate/:id", patch(activate_user))
        .route("/deactivate/:id", patch(deactivate_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", delete(logout_redirect).post(logout))
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .route("/api", get(home))
        .nest(BASE_PATH, user_routes)
        .fallback(route_not_found)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "users"
    }))
}

pub async fn home() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to Knites Music Player" }))
}

pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let registered = state.user_service.register(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": TokenResponse::from(registered),
            "status": 201,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Response> {
    match state.user_service.login(&payload).await? {
        LoginOutcome::Success(auth) => Ok(Json(json!({
            "data": TokenResponse::from(auth),
            "message": LOGIN_MESSAGE,
            "status": 200,
        }))
        .into_response()),
        LoginOutcome::Inactive { user_id } => {
            Ok(redirect(&format!("/activate/{user_id}")))
        }
    }
}

/// Tokens are not tracked server side, so logging out only sends the client home
pub async fn logout_redirect() -> Response {
    redirect("/")
}

pub async fn logout() -> impl IntoResponse {
    info!("Logout request");
    Json(json!({ "message": "Logged out", "status": 200 }))
}

pub async fn get_all_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users: Vec<PublicUser> = state
        .user_service
        .list()
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(json!({ "users": users, "status": 200 })))
}

pub async fn get_user(TargetUser(user): TargetUser) -> impl IntoResponse {
    Json(json!({ "data": PublicUser::from(&user), "status": 200 }))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    TargetUser(target): TargetUser,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    require_owner(&claims, target.id)?;
    require_active(&target)?;
    let payload: UpdateRequest = parse_json(&body)?;

    let user = state.user_service.update(&target, &payload).await?;

    Ok(Json(json!({
        "data": PublicUser::from(&user),
        "message": "Update Successful",
        "status": 200,
    })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    TargetUser(target): TargetUser,
) -> ApiResult<impl IntoResponse> {
    require_admin(&claims)?;
    require_owner(&claims, target.id)?;

    state.user_service.delete(target.id).await?;

    Ok(Json(json!({ "message": "User Deleted", "status": 200 })))
}

pub async fn activate_user(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    TargetUser(target): TargetUser,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    require_owner(&claims, target.id)?;
    let payload: ActivationRequest = parse_json(&body)?;

    let auth = state.user_service.set_active(&target, &payload, true).await?;

    Ok(Json(json!({
        "message": "Account reactivated",
        "token": auth.token,
        "status": 200,
    })))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    TargetUser(target): TargetUser,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    require_owner(&claims, target.id)?;
    let payload: ActivationRequest = parse_json(&body)?;

    let auth = state.user_service.set_active(&target, &payload, false).await?;

    Ok(Json(json!({
        "message": "Account deactivated",
        "token": auth.token,
        "status": 200,
    })))
}

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}
