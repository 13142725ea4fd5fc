//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod speech_backend;
mod voice_registry;
mod voice_storage;

pub use speech_backend::{BackendError, SpeechBackend, SpeechRequest};
pub use voice_registry::{RegistryError, VoiceRegistryPort};
pub use voice_storage::{StorageError, VoiceStoragePort};
