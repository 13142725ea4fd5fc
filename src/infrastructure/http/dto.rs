//! Data Transfer Objects

use serde::Serialize;

use crate::domain::voice::VoiceProfile;

/// 注册成功响应
#[derive(Debug, Serialize)]
pub struct RegisterVoiceResponse {
    pub voice_id: String,
    pub language: String,
    pub ready: bool,
    pub preview_url: String,
}

impl From<&VoiceProfile> for RegisterVoiceResponse {
    fn from(profile: &VoiceProfile) -> Self {
        Self {
            voice_id: profile.voice_id().to_string(),
            language: profile.language().to_string(),
            ready: true,
            preview_url: preview_url(profile.voice_id().as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceStatusResponse {
    pub voice_id: String,
    pub ready: bool,
}

/// 音色列表项
#[derive(Debug, Serialize)]
pub struct VoiceSummary {
    pub voice_id: String,
    pub language: String,
    pub preview_url: String,
    pub created_at: String,
}

impl From<&VoiceProfile> for VoiceSummary {
    fn from(profile: &VoiceProfile) -> Self {
        Self {
            voice_id: profile.voice_id().to_string(),
            language: profile.language().to_string(),
            preview_url: preview_url(profile.voice_id().as_str()),
            created_at: profile.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceListResponse {
    pub voices: Vec<VoiceSummary>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub engine_ready: bool,
    pub version: &'static str,
}

/// 预览音频的相对 URL
pub fn preview_url(voice_id: &str) -> String {
    format!("/voice/{}/preview", voice_id)
}
