//! User service models

pub mod requests;
pub mod user;

pub use requests::{ActivationRequest, ActiveFlag, LoginRequest, RegisterRequest, UpdateRequest};
pub use user::{NewUser, PublicUser, UpdateUser, User};
