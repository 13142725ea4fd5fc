//! Voice Registry Port - 音色索引
//!
//! voice_id → VoiceProfile 的持久化映射。
//! 实现假定同一时刻只有一个写入者，写入方的互斥由调用方保证。

use thiserror::Error;

use crate::domain::voice::VoiceProfile;

/// Registry 错误
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Index corrupted: {0}")]
    Corrupted(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Voice Registry Port
pub trait VoiceRegistryPort: Send + Sync {
    /// 根据 ID 查找音色
    fn get(&self, voice_id: &str) -> Option<VoiceProfile>;

    /// 就绪判断：索引中存在即就绪
    fn contains(&self, voice_id: &str) -> bool {
        self.get(voice_id).is_some()
    }

    /// 插入或覆盖，并同步写回持久化索引
    fn put(&self, profile: VoiceProfile) -> Result<(), RegistryError>;

    /// 所有音色，按创建时间排序
    fn list(&self) -> Vec<VoiceProfile>;

    /// 将当前内存中的完整集合写回持久化索引
    fn save(&self) -> Result<(), RegistryError>;
}
