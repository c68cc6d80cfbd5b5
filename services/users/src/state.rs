//! Application state shared across handlers

use std::sync::Arc;

use crate::{jwt::JwtService, repositories::UserStore, service::UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub user_service: UserService,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, jwt_service: JwtService) -> Self {
        Self {
            user_service: UserService::new(store, jwt_service.clone()),
            jwt_service,
        }
    }
}
