use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::ApiState;
use crate::state::GlobalState;
use crate::types::source::{SourceStatus, StatusScope};

pub async fn get_status(State(state): State<Arc<ApiState>>) -> Json<GlobalState> {
    Json(state.store.snapshot())
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub source: StatusScope,
    pub status: SourceStatus,
}

#[derive(Serialize)]
pub struct SetStatusResponse {
    pub status: &'static str,
    pub message: String,
}

pub async fn set_status(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SetStatusRequest>,
) -> Json<SetStatusResponse> {
    state.controller.set_status(req.source, req.status).await;

    Json(SetStatusResponse {
        status: "success",
        message: format!("status changed to {} for {:?}", req.status, req.source),
    })
}
