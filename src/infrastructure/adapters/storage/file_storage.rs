//! File Storage - 文件系统音色产物存储
//!
//! 实现 VoiceStoragePort trait
//!
//! 目录布局:
//! ```text
//! <voices_dir>/<voice_id>/ref_<原始文件名>
//! <voices_dir>/<voice_id>/preview.wav
//! <voices_dir>/<voice_id>/last_output.wav
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::application::ports::{StorageError, VoiceStoragePort};
use crate::domain::voice::VoiceId;

const PREVIEW_FILE: &str = "preview.wav";
const LAST_OUTPUT_FILE: &str = "last_output.wav";
const DEFAULT_REFERENCE_NAME: &str = "ref.wav";

/// 文件系统音色存储
pub struct FileVoiceStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileVoiceStorage {
    /// 创建新的文件存储
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir).map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// 参考音频文件名: `ref_<basename>`，丢弃客户端路径部分
fn reference_file_name(filename: &str) -> String {
    let basename = Path::new(filename.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_REFERENCE_NAME);
    format!("ref_{}", basename)
}

impl VoiceStoragePort for FileVoiceStorage {
    fn voice_dir(&self, voice_id: &VoiceId) -> PathBuf {
        self.base_dir.join(voice_id.as_str())
    }

    fn save_reference(
        &self,
        voice_id: &VoiceId,
        filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let voice_dir = self.voice_dir(voice_id);
        fs::create_dir_all(&voice_dir).map_err(|e| StorageError::IoError(e.to_string()))?;

        let path = voice_dir.join(reference_file_name(filename));
        fs::write(&path, data).map_err(|e| StorageError::IoError(e.to_string()))?;

        tracing::debug!(
            voice_id = %voice_id,
            path = %path.display(),
            size = data.len(),
            "Saved reference audio"
        );

        Ok(path)
    }

    fn preview_path(&self, voice_id: &VoiceId) -> PathBuf {
        self.voice_dir(voice_id).join(PREVIEW_FILE)
    }

    fn last_output_path(&self, voice_id: &VoiceId) -> PathBuf {
        self.voice_dir(voice_id).join(LAST_OUTPUT_FILE)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::FileNotFound(path.to_string_lossy().to_string())
            } else {
                StorageError::IoError(e.to_string())
            }
        })
    }
}
