//! Voice Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Language, VoiceId};

/// VoiceProfile 聚合根
///
/// 不变量:
/// - 只有在预热合成成功之后才会被创建，存在即代表“就绪”
/// - 创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    voice_id: VoiceId,
    ref_audio_path: PathBuf,
    language: Language,
    preview_wav_path: PathBuf,
    /// 旧索引没有此字段，回退为 Unix 纪元
    #[serde(default)]
    created_at: DateTime<Utc>,
}

impl VoiceProfile {
    pub fn new(
        voice_id: VoiceId,
        ref_audio_path: PathBuf,
        language: Language,
        preview_wav_path: PathBuf,
    ) -> Self {
        Self {
            voice_id,
            ref_audio_path,
            language,
            preview_wav_path,
            created_at: Utc::now(),
        }
    }

    // Getters
    pub fn voice_id(&self) -> &VoiceId {
        &self.voice_id
    }

    pub fn ref_audio_path(&self) -> &Path {
        &self.ref_audio_path
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn preview_wav_path(&self) -> &Path {
        &self.preview_wav_path
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
