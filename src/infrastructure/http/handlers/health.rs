//! Health Handler

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::HealthResponse;
use crate::infrastructure::http::state::AppState;

/// Health endpoint - 进程存活即返回 ok，engine_ready 反映引擎是否初始化完成
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        engine_ready: state.engine_ready(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
