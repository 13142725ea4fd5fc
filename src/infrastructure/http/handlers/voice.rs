//! Voice HTTP Handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use super::form;
use crate::application::RegisterVoice;
use crate::domain::voice::DEFAULT_LANGUAGE;
use crate::infrastructure::http::dto::{
    RegisterVoiceResponse, VoiceListResponse, VoiceStatusResponse, VoiceSummary,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 未提供文件名时参考音频的默认名
const DEFAULT_REFERENCE_FILENAME: &str = "ref.wav";

/// 注册音色
///
/// multipart 字段: audio (必填), warmup_text, language (默认 es), voice_id
pub async fn register_voice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<RegisterVoiceResponse>, ApiError> {
    let engine = state.engine()?;

    let mut audio: Option<(Vec<u8>, String)> = None;
    let mut warmup_text = String::new();
    let mut language = DEFAULT_LANGUAGE.to_string();
    let mut voice_id: Option<String> = None;

    while let Some(field) = form::next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "audio" => {
                let filename = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_REFERENCE_FILENAME)
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read audio: {}", e)))?;
                audio = Some((data.to_vec(), filename));
            }
            "warmup_text" => warmup_text = form::text(field, "warmup_text").await?,
            "language" => language = form::text(field, "language").await?,
            "voice_id" => {
                let value = form::text(field, "voice_id").await?;
                voice_id = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let (reference_audio, reference_filename) =
        audio.ok_or_else(|| ApiError::BadRequest("audio file is required".to_string()))?;
    if reference_audio.is_empty() {
        return Err(ApiError::BadRequest("empty audio".to_string()));
    }

    let command = RegisterVoice {
        reference_audio,
        reference_filename,
        warmup_text,
        language,
        voice_id,
    };

    let profile = tokio::task::spawn_blocking(move || engine.register_voice(command)).await??;

    Ok(Json(RegisterVoiceResponse::from(&profile)))
}

/// 查询音色是否就绪
pub async fn voice_status(
    State(state): State<Arc<AppState>>,
    Path(voice_id): Path<String>,
) -> Result<Json<VoiceStatusResponse>, ApiError> {
    let engine = state.engine()?;
    let ready = engine.is_ready(&voice_id);

    Ok(Json(VoiceStatusResponse { voice_id, ready }))
}

/// 获取预热预览音频
pub async fn voice_preview(
    State(state): State<Arc<AppState>>,
    Path(voice_id): Path<String>,
) -> Result<Response, ApiError> {
    let engine = state.engine()?;
    let preview_path = engine.preview_path(&voice_id)?;

    let file = tokio::fs::File::open(&preview_path).await.map_err(|e| {
        ApiError::Internal(format!("Failed to read preview for {}: {}", voice_id, e))
    })?;
    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?
        .len();

    // 流式返回文件内容
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, file_size)
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// 列出所有已就绪音色
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VoiceListResponse>, ApiError> {
    let engine = state.engine()?;
    let voices = engine
        .list_profiles()
        .iter()
        .map(VoiceSummary::from)
        .collect();

    Ok(Json(VoiceListResponse { voices }))
}
