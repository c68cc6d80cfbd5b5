//! User accounts service for the Knites music player
//!
//! Registration, login, profile reads and updates, activation and deletion
//! of user accounts over a small REST API. Persistence sits behind
//! [`repositories::UserStore`]; tokens are stateless JWTs.

pub mod authorization;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
