//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，调用方按种类分支处理

use thiserror::Error;

use crate::application::ports::{BackendError, RegistryError, StorageError};
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入无效（空音频、空文本、不支持的语言）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 音色未注册
    #[error("Voice not found: {0}")]
    NotFound(String),

    /// 推理后端失败
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    /// 音色产物读写失败
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 索引持久化失败
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

impl ApplicationError {
    /// 创建输入无效错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(voice_id: impl Into<String>) -> Self {
        Self::NotFound(voice_id.into())
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<BackendError> for ApplicationError {
    fn from(err: BackendError) -> Self {
        Self::EngineFailure(err.to_string())
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<RegistryError> for ApplicationError {
    fn from(err: RegistryError) -> Self {
        Self::PersistenceError(err.to_string())
    }
}
