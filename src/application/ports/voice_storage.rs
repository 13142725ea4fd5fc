//! Voice Storage Port - 音色产物存储
//!
//! 每个音色一个目录：参考音频、预热预览、最近一次合成输出

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::voice::VoiceId;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Voice Storage Port
pub trait VoiceStoragePort: Send + Sync {
    /// 音色目录
    fn voice_dir(&self, voice_id: &VoiceId) -> PathBuf;

    /// 保存参考音频（同名覆盖），返回保存路径
    fn save_reference(
        &self,
        voice_id: &VoiceId,
        filename: &str,
        data: &[u8],
    ) -> Result<PathBuf, StorageError>;

    /// 预热预览音频路径
    fn preview_path(&self, voice_id: &VoiceId) -> PathBuf;

    /// 最近一次合成输出路径
    fn last_output_path(&self, voice_id: &VoiceId) -> PathBuf;

    /// 读取音频文件
    fn read(&self, path: &std::path::Path) -> Result<Vec<u8>, StorageError>;
}
