//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色标识（VoiceId）与语言（Language）校验
//! - VoiceProfile 元数据

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::VoiceProfile;
pub use errors::VoiceError;
pub use value_objects::{Language, VoiceId, DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
