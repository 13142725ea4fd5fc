//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechBackend、VoiceRegistry、VoiceStorage）
//! - commands: 注册/合成命令
//! - inference_gateway: 推理后端的串行化访问
//! - voice_clone_engine: 注册与合成编排
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod inference_gateway;
pub mod ports;
pub mod voice_clone_engine;

// Re-exports
pub use commands::{RegisterVoice, SynthesizeSpeech};
pub use error::ApplicationError;
pub use inference_gateway::{Device, DevicePreference, InferenceGateway};
pub use ports::{
    BackendError, RegistryError, SpeechBackend, SpeechRequest, StorageError, VoiceRegistryPort,
    VoiceStoragePort,
};
pub use voice_clone_engine::{EngineOptions, VoiceCloneEngine, DEFAULT_WARMUP_TEXT};
