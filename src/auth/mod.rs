use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod password;
pub mod service;
pub mod store;
pub mod validate;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
