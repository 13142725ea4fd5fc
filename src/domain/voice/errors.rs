//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid voice_id: {0}")]
    InvalidVoiceId(String),

    #[error("Reference audio is empty")]
    EmptyReferenceAudio,

    #[error("Text is empty")]
    EmptyText,
}
