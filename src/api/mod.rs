pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::api_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_api_router(state: AppState) -> Router {
    Router::new()
        .route("/get_info", get(get_info))
        .route("/configure", post(configure))
        .route("/set_network_mode", post(set_network_mode))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), api_auth_middleware))
        .with_state(state)
}
