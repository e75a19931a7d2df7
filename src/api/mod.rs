pub mod rest;
pub mod websocket;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::control::StatusController;
use crate::hub::BroadcastHub;
use crate::state::StateStore;

pub struct ApiState {
    pub store: Arc<StateStore>,
    pub hub: Arc<BroadcastHub>,
    pub controller: Arc<StatusController>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/status", get(rest::get_status))
        .route("/api/set-status", post(rest::set_status))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
