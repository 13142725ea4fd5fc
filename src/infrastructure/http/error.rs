//! HTTP Error Handling
//!
//! 应用层错误种类映射到 HTTP 状态码，响应体为 `{errno, detail}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(errno: i32, detail: impl Into<String>) -> Self {
        Self {
            errno,
            detail: detail.into(),
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const INTERNAL_ERROR: i32 = 500;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    /// 引擎尚未完成初始化
    EngineUnavailable,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::EngineUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
            ApiError::EngineUnavailable => "engine not initialized".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();

        match &self {
            ApiError::NotFound(_) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %detail, "Resource not found");
            }
            ApiError::BadRequest(_) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %detail, "Bad request");
            }
            ApiError::Internal(_) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %detail, "Internal server error");
            }
            ApiError::EngineUnavailable => {
                tracing::error!(errno = errno::INTERNAL_ERROR, "Engine not initialized");
            }
        }

        let body = ErrorResponse::new(status.as_u16() as i32, detail);
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ApplicationError::NotFound(id) => ApiError::NotFound(format!("voice not found: {}", id)),
            ApplicationError::EngineFailure(_)
            | ApplicationError::StorageError(_)
            | ApplicationError::PersistenceError(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {}", e))
    }
}
