//! HTTP Routes
//!
//! API Endpoints:
//! - /health                       GET   健康检查
//! - /voices                       GET   列出所有音色
//! - /voice/register               POST  注册音色（multipart，预热完成后返回）
//! - /voice/:voice_id/status       GET   音色是否就绪
//! - /voice/:voice_id/preview      GET   预热预览音频
//! - /tts                          POST  合成语音

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/voices", get(handlers::list_voices))
        .nest("/voice", voice_routes())
        .route("/tts", post(handlers::synthesize))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::register_voice))
        .route("/:voice_id/status", get(handlers::voice_status))
        .route("/:voice_id/preview", get(handlers::voice_preview))
}
