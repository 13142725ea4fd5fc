//! Bootstrap - 按配置组装 VoiceCloneEngine
//!
//! 构建过程是阻塞的（创建目录、读取索引、连接推理后端），
//! 由 main 放到 blocking 线程上执行，HTTP 服务不必等待它完成

use std::sync::Arc;
use thiserror::Error;

use crate::application::ports::{BackendError, SpeechBackend, StorageError};
use crate::application::{Device, EngineOptions, InferenceGateway, VoiceCloneEngine};
use crate::config::{BackendKind, EngineConfig, StorageConfig};
use crate::domain::voice::{Language, VoiceError};
use crate::infrastructure::adapters::{
    FakeSpeechBackend, FileVoiceStorage, XttsHttpBackend, XttsHttpBackendConfig,
};
use crate::infrastructure::persistence::JsonVoiceRegistry;

/// 引擎初始化错误
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Failed to prepare voice storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to open speech backend: {0}")]
    Backend(#[from] BackendError),

    #[error("Invalid engine option: {0}")]
    InvalidOption(#[from] VoiceError),
}

/// 组装引擎：存储 → 索引 → 推理网关 → 编排
pub fn build_engine(
    engine: &EngineConfig,
    storage: &StorageConfig,
) -> Result<VoiceCloneEngine, BootstrapError> {
    let options = EngineOptions {
        default_language: Language::parse(&engine.default_language)?,
        default_warmup_text: engine.default_warmup_text.clone(),
    };

    let voice_storage = FileVoiceStorage::new(storage.voices_dir())?;
    let registry = JsonVoiceRegistry::load(storage.index_path());

    let gateway = InferenceGateway::open(engine.device, engine.split_sentences, |device| {
        open_backend(engine, device)
    })?;

    tracing::info!(
        voices = registry.len(),
        device = %gateway.device(),
        "Voice clone engine ready"
    );

    Ok(VoiceCloneEngine::new(
        Arc::new(registry),
        Arc::new(voice_storage),
        Arc::new(gateway),
        options,
    ))
}

fn open_backend(
    engine: &EngineConfig,
    device: Device,
) -> Result<Box<dyn SpeechBackend>, BackendError> {
    match engine.backend {
        BackendKind::XttsHttp => {
            let config = XttsHttpBackendConfig {
                base_url: engine.url.clone(),
                model_name: engine.model_name.clone(),
                timeout_secs: engine.timeout_secs,
            };
            let backend = XttsHttpBackend::new(config, device)?;

            // sidecar 可能晚于本服务启动，不可达只告警
            if !backend.health_check() {
                tracing::warn!(url = %engine.url, "XTTS service health check failed");
            }

            Ok(Box::new(backend))
        }
        BackendKind::Fake => Ok(Box::new(FakeSpeechBackend::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{DevicePreference, RegisterVoice};
    use crate::infrastructure::adapters::tts::test_wav;

    fn fake_engine_config() -> EngineConfig {
        EngineConfig {
            backend: BackendKind::Fake,
            device: DevicePreference::Cpu,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_fake_engine_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            work_dir: dir.path().to_path_buf(),
        };

        let engine = build_engine(&fake_engine_config(), &storage).unwrap();
        assert!(storage.voices_dir().is_dir());
        assert!(engine.list_profiles().is_empty());
        assert_eq!(engine.gateway().device(), Device::Cpu);
    }

    #[test]
    fn test_rebuilt_engine_recovers_voices() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            work_dir: dir.path().to_path_buf(),
        };

        let engine = build_engine(&fake_engine_config(), &storage).unwrap();
        engine
            .register_voice(RegisterVoice {
                reference_audio: test_wav(),
                reference_filename: "sample.wav".to_string(),
                warmup_text: String::new(),
                language: "en".to_string(),
                voice_id: Some("narrator".to_string()),
            })
            .unwrap();
        drop(engine);

        let restarted = build_engine(&fake_engine_config(), &storage).unwrap();
        assert!(restarted.is_ready("narrator"));
        assert!(storage.index_path().is_file());
    }

    #[test]
    fn test_invalid_default_language_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            work_dir: dir.path().to_path_buf(),
        };
        let engine = EngineConfig {
            default_language: "klingon".to_string(),
            ..fake_engine_config()
        };

        let err = build_engine(&engine, &storage).err().unwrap();
        assert!(matches!(err, BootstrapError::InvalidOption(_)));
    }
}
