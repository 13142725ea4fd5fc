//! TTS Handler

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::form;
use crate::application::SynthesizeSpeech;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 用已注册音色合成语音
///
/// 表单字段: voice_id (必填), text (必填), language (可选，覆盖注册语言)
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let engine = state.engine()?;

    let mut voice_id: Option<String> = None;
    let mut text: Option<String> = None;
    let mut language: Option<String> = None;

    while let Some(field) = form::next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "voice_id" => voice_id = Some(form::text(field, "voice_id").await?),
            "text" => text = Some(form::text(field, "text").await?),
            "language" => language = Some(form::text(field, "language").await?),
            _ => {}
        }
    }

    let voice_id =
        voice_id.ok_or_else(|| ApiError::BadRequest("voice_id is required".to_string()))?;
    let text = text.ok_or_else(|| ApiError::BadRequest("text is required".to_string()))?;

    let command = SynthesizeSpeech {
        voice_id,
        text,
        language: language.filter(|l| !l.trim().is_empty()),
    };

    let audio = tokio::task::spawn_blocking(move || engine.synthesize(command)).await??;

    Ok(([(header::CONTENT_TYPE, "audio/wav")], audio).into_response())
}
