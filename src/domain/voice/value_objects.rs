//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VoiceError;

/// XTTS-v2 支持的语言代码
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "zh-cn", "ja", "hu",
    "ko",
];

/// 未指定语言时使用的默认语言
pub const DEFAULT_LANGUAGE: &str = "es";

const MAX_VOICE_ID_LEN: usize = 128;

/// 音色唯一标识
///
/// 不变量:
/// - 非空、已去除首尾空白
/// - 可以安全地作为单个目录名使用（不含路径分隔符，不是 `.` / `..`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoiceId(String);

impl VoiceId {
    /// 生成新的标识（32 位小写十六进制）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// 解析客户端提供的标识
    pub fn parse(raw: &str) -> Result<Self, VoiceError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(VoiceError::InvalidVoiceId("voice_id cannot be empty".to_string()));
        }
        if id.len() > MAX_VOICE_ID_LEN {
            return Err(VoiceError::InvalidVoiceId(format!(
                "voice_id longer than {} bytes",
                MAX_VOICE_ID_LEN
            )));
        }
        if id == "." || id == ".." || id.contains(|c: char| c == '/' || c == '\\' || c.is_control())
        {
            return Err(VoiceError::InvalidVoiceId(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// 客户端给了非空标识则原样采用，否则生成新标识
    pub fn resolve(requested: Option<&str>) -> Result<Self, VoiceError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => Self::parse(id),
            None => Ok(Self::generate()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for VoiceId {
    type Error = VoiceError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<VoiceId> for String {
    fn from(id: VoiceId) -> Self {
        id.0
    }
}

/// 规范化后的语言代码（小写、去空白、属于支持集合）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    pub fn parse(raw: &str) -> Result<Self, VoiceError> {
        let code = raw.trim().to_lowercase();
        if SUPPORTED_LANGUAGES.contains(&code.as_str()) {
            Ok(Self(code))
        } else {
            Err(VoiceError::UnsupportedLanguage(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Language {
    type Error = VoiceError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_is_normalized() {
        let lang = Language::parse("  EN ").unwrap();
        assert_eq!(lang.as_str(), "en");

        let lang = Language::parse("ZH-CN").unwrap();
        assert_eq!(lang.as_str(), "zh-cn");
    }

    #[test]
    fn test_unsupported_language() {
        assert_eq!(
            Language::parse("xx"),
            Err(VoiceError::UnsupportedLanguage("xx".to_string()))
        );
        assert!(Language::parse("").is_err());
    }

    #[test]
    fn test_default_language_is_supported() {
        assert_eq!(Language::parse(DEFAULT_LANGUAGE).unwrap(), Language::default());
    }

    #[test]
    fn test_generated_voice_id_is_hex() {
        let id = VoiceId::generate();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, VoiceId::generate());
    }

    #[test]
    fn test_resolve_uses_requested_id() {
        let id = VoiceId::resolve(Some("  narrator-01 ")).unwrap();
        assert_eq!(id.as_str(), "narrator-01");

        let generated = VoiceId::resolve(Some("   ")).unwrap();
        assert_eq!(generated.as_str().len(), 32);

        let generated = VoiceId::resolve(None).unwrap();
        assert_eq!(generated.as_str().len(), 32);
    }

    #[test]
    fn test_voice_id_rejects_path_segments() {
        assert!(VoiceId::parse("..").is_err());
        assert!(VoiceId::parse("a/b").is_err());
        assert!(VoiceId::parse("a\\b").is_err());
        assert!(VoiceId::parse(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let id: VoiceId = serde_json::from_str("\" narrator \"").unwrap();
        assert_eq!(id.as_str(), "narrator");
        assert!(serde_json::from_str::<VoiceId>("\"../x\"").is_err());
        assert!(serde_json::from_str::<VoiceId>("\"\"").is_err());

        let lang: Language = serde_json::from_str("\"ZH-CN\"").unwrap();
        assert_eq!(lang.as_str(), "zh-cn");
        assert!(serde_json::from_str::<Language>("\"xx\"").is_err());

        assert_eq!(serde_json::to_string(&id).unwrap(), "\"narrator\"");
    }
}
