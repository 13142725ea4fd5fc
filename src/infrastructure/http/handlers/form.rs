//! Multipart 表单读取辅助

use axum::extract::multipart::{Field, Multipart};

use crate::infrastructure::http::error::ApiError;

/// 取下一个字段，读取失败视为请求错误
pub async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))
}

/// 读取文本字段
pub async fn text(field: Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))
}
