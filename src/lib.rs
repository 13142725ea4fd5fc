//! voxclone - 语音克隆 TTS 服务
//!
//! 上传一段参考音频注册音色，之后用该音色合成任意文本。
//!
//! 领域层 (domain/):
//! - Voice Context: VoiceProfile、VoiceId、Language
//!
//! 应用层 (application/):
//! - Ports: SpeechBackend, VoiceRegistryPort, VoiceStoragePort
//! - InferenceGateway: 推理后端的唯一入口，调用互斥执行
//! - VoiceCloneEngine: 注册（预热 + 缓存）与合成编排
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（axum）
//! - Persistence: JSON 索引
//! - Adapters: XTTS sidecar 后端、假后端、文件存储
//! - Bootstrap: 按配置组装引擎

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{InferenceGateway, VoiceCloneEngine};
pub use config::{load_config, AppConfig};
