use axum::Router;

use crate::state::AppState;

mod claims;
mod dto;
mod extractors;
pub mod handlers;
mod jwt;
mod password;
mod repo;

pub use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
