//! Speech Backend Port - 语音合成能力抽象
//!
//! 推理模型本身是不透明的："参考音频 + 文本 + 语言 → 音频"。
//! 实现不要求线程安全，调用方（InferenceGateway）负责串行化。

use std::path::Path;
use thiserror::Error;

/// 后端错误
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid reference audio: {0}")]
    InvalidReferenceAudio(String),

    #[error("Speaker not cached: {0}")]
    SpeakerNotCached(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 单次合成请求
#[derive(Debug, Clone, Copy)]
pub struct SpeechRequest<'a> {
    /// 要合成的文本
    pub text: &'a str,
    /// 规范化后的语言代码
    pub language: &'a str,
    /// 后端内部缓存音色表征所用的键
    pub speaker: &'a str,
    /// 参考音频；只有预热调用才会提供
    pub speaker_wav: Option<&'a Path>,
    pub split_sentences: bool,
}

/// Speech Backend Port
pub trait SpeechBackend: Send {
    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;

    /// 合成音频并写入 `output`
    fn tts_to_file(&mut self, request: &SpeechRequest<'_>, output: &Path)
        -> Result<(), BackendError>;
}
