//! Voice Clone Engine - 注册与合成编排
//!
//! 每个 voice_id 的状态: Unregistered → Registering → Ready。
//! 没有持久化的失败状态：注册失败时索引里不会出现任何条目。
//!
//! 所有方法都是阻塞的（推理调用可能持续数秒），
//! 异步调用方需要放到 `spawn_blocking` 中执行。

use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::application::commands::{RegisterVoice, SynthesizeSpeech};
use crate::application::error::ApplicationError;
use crate::application::inference_gateway::InferenceGateway;
use crate::application::ports::{BackendError, VoiceRegistryPort, VoiceStoragePort};
use crate::domain::voice::{Language, VoiceError, VoiceId, VoiceProfile};

/// 默认预热文本
pub const DEFAULT_WARMUP_TEXT: &str = "Hola. Esta es una prueba de clonación de voz.";

/// 编排参数
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// 注册时未指定语言所用的语言
    pub default_language: Language,
    /// 预热文本为空时使用的短句
    pub default_warmup_text: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            default_warmup_text: DEFAULT_WARMUP_TEXT.to_string(),
        }
    }
}

/// Voice Clone Engine
pub struct VoiceCloneEngine {
    registry: Arc<dyn VoiceRegistryPort>,
    storage: Arc<dyn VoiceStoragePort>,
    gateway: Arc<InferenceGateway>,
    options: EngineOptions,
    /// 同一音色目录下的产物写入与读回串行
    voice_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl VoiceCloneEngine {
    pub fn new(
        registry: Arc<dyn VoiceRegistryPort>,
        storage: Arc<dyn VoiceStoragePort>,
        gateway: Arc<InferenceGateway>,
        options: EngineOptions,
    ) -> Self {
        Self {
            registry,
            storage,
            gateway,
            options,
            voice_locks: DashMap::new(),
        }
    }

    pub fn gateway(&self) -> &InferenceGateway {
        &self.gateway
    }

    /// 注册音色
    ///
    /// 保存参考音频 → 预热合成（写 preview.wav，并让后端缓存 speaker）→ 写入索引。
    /// 任一步失败都不会提交 VoiceProfile；已写入磁盘的产物保留不清理，
    /// 未提交音色的锁条目被移除。
    pub fn register_voice(&self, command: RegisterVoice) -> Result<VoiceProfile, ApplicationError> {
        let warmup_text = if command.warmup_text.trim().is_empty() {
            self.options.default_warmup_text.clone()
        } else {
            command.warmup_text.clone()
        };

        let language = if command.language.trim().is_empty() {
            self.options.default_language.clone()
        } else {
            Language::parse(&command.language)?
        };

        let voice_id = VoiceId::resolve(command.voice_id.as_deref())?;

        if command.reference_audio.is_empty() {
            return Err(VoiceError::EmptyReferenceAudio.into());
        }

        tracing::info!(
            voice_id = %voice_id,
            language = %language,
            audio_size = command.reference_audio.len(),
            "Registering voice"
        );

        let lock = self.voice_lock(&voice_id);
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let result =
            self.warm_up_and_commit(&command, voice_id.clone(), &warmup_text, language);
        drop(guard);

        match result {
            Ok(profile) => {
                tracing::info!(
                    voice_id = %profile.voice_id(),
                    language = %profile.language(),
                    "Voice registered"
                );
                Ok(profile)
            }
            Err(e) => {
                self.release_voice_lock(&voice_id, &lock);
                Err(e)
            }
        }
    }

    /// 保存参考音频、预热、提交索引；调用方持有该音色的锁
    fn warm_up_and_commit(
        &self,
        command: &RegisterVoice,
        voice_id: VoiceId,
        warmup_text: &str,
        language: Language,
    ) -> Result<VoiceProfile, ApplicationError> {
        let ref_path = self.storage.save_reference(
            &voice_id,
            &command.reference_filename,
            &command.reference_audio,
        )?;
        let preview_path = self.storage.preview_path(&voice_id);

        self.gateway.warmup_and_cache(
            &ref_path,
            voice_id.as_str(),
            warmup_text,
            &language,
            &preview_path,
        )?;

        let profile = VoiceProfile::new(voice_id, ref_path, language, preview_path);
        self.registry.put(profile.clone())?;

        Ok(profile)
    }

    /// 用已注册音色合成语音，返回 WAV 字节
    ///
    /// 输出写到音色目录下的 last_output.wav，每次覆盖
    pub fn synthesize(&self, command: SynthesizeSpeech) -> Result<Vec<u8>, ApplicationError> {
        if command.text.trim().is_empty() {
            return Err(VoiceError::EmptyText.into());
        }

        let profile = self
            .registry
            .get(&command.voice_id)
            .ok_or_else(|| ApplicationError::not_found(command.voice_id.clone()))?;

        let language = match command.language.as_deref().map(str::trim) {
            Some(lang) if !lang.is_empty() => Language::parse(lang)?,
            _ => profile.language().clone(),
        };

        let voice_id = profile.voice_id();
        let output = self.storage.last_output_path(voice_id);

        let lock = self.voice_lock(voice_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self
            .gateway
            .synthesize_cached(voice_id.as_str(), &command.text, &language, &output)
        {
            Ok(()) => {}
            // 后端重启后丢失了缓存，用保存的参考音频重新预热
            Err(BackendError::SpeakerNotCached(_)) => {
                tracing::warn!(voice_id = %voice_id, "Speaker not cached by backend, re-warming");
                self.gateway.warmup_and_cache(
                    profile.ref_audio_path(),
                    voice_id.as_str(),
                    &command.text,
                    &language,
                    &output,
                )?;
            }
            Err(e) => return Err(e.into()),
        }
        let audio = self.storage.read(&output)?;

        tracing::info!(
            voice_id = %voice_id,
            language = %language,
            text_len = command.text.len(),
            audio_size = audio.len(),
            "Speech synthesized"
        );

        Ok(audio)
    }

    /// 音色是否就绪（已提交到索引）
    pub fn is_ready(&self, voice_id: &str) -> bool {
        self.registry.contains(voice_id)
    }

    pub fn get_profile(&self, voice_id: &str) -> Option<VoiceProfile> {
        self.registry.get(voice_id)
    }

    pub fn list_profiles(&self) -> Vec<VoiceProfile> {
        self.registry.list()
    }

    /// 预热预览音频路径
    pub fn preview_path(&self, voice_id: &str) -> Result<PathBuf, ApplicationError> {
        self.registry
            .get(voice_id)
            .map(|p| p.preview_wav_path().to_path_buf())
            .ok_or_else(|| ApplicationError::not_found(voice_id))
    }

    fn voice_lock(&self, voice_id: &VoiceId) -> Arc<Mutex<()>> {
        self.voice_locks
            .entry(voice_id.as_str().to_string())
            .or_default()
            .value()
            .clone()
    }

    /// 注册失败后移除锁条目；仍有其他请求持有或等待时保留
    fn release_voice_lock(&self, voice_id: &VoiceId, lock: &Arc<Mutex<()>>) {
        if self.registry.contains(voice_id.as_str()) {
            return;
        }
        self.voice_locks.remove_if(voice_id.as_str(), |_, entry| {
            Arc::ptr_eq(entry, lock) && Arc::strong_count(entry) == 2
        });
    }
}
