//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::{DevicePreference, DEFAULT_WARMUP_TEXT};
use crate::domain::voice::DEFAULT_LANGUAGE;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 推理引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节），用于参考音频上传
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置（浏览器前端）
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default)]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 推理后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// XTTS-v2 推理 sidecar
    #[default]
    XttsHttp,
    /// 进程内假后端（开发/测试）
    Fake,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::XttsHttp => "xtts_http",
            BackendKind::Fake => "fake",
        }
    }
}

/// 推理引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// 后端类型
    #[serde(default)]
    pub backend: BackendKind,

    /// Sidecar 基础 URL
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// 模型名称
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// 执行设备: auto / cuda / cpu
    #[serde(default)]
    pub device: DevicePreference,

    /// 单次推理超时时间（秒）
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// 是否按句切分长文本
    #[serde(default = "default_split_sentences")]
    pub split_sentences: bool,

    /// 注册时未指定语言所用的语言
    #[serde(default = "default_language")]
    pub default_language: String,

    /// 预热文本为空时使用的短句
    #[serde(default = "default_warmup_text")]
    pub default_warmup_text: String,
}

fn default_engine_url() -> String {
    "http://localhost:8020".to_string()
}

fn default_model_name() -> String {
    "tts_models/multilingual/multi-dataset/xtts_v2".to_string()
}

fn default_engine_timeout() -> u64 {
    600
}

fn default_split_sentences() -> bool {
    true
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_warmup_text() -> String {
    DEFAULT_WARMUP_TEXT.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            url: default_engine_url(),
            model_name: default_model_name(),
            device: DevicePreference::default(),
            timeout_secs: default_engine_timeout(),
            split_sentences: default_split_sentences(),
            default_language: default_language(),
            default_warmup_text: default_warmup_text(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 工作目录，音色产物与索引位于 `<work_dir>/voices`
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
        }
    }
}

impl StorageConfig {
    /// 音色目录
    pub fn voices_dir(&self) -> PathBuf {
        self.work_dir.join("voices")
    }

    /// 索引文件路径
    pub fn index_path(&self) -> PathBuf {
        self.voices_dir().join("index.json")
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.engine.backend, BackendKind::XttsHttp);
        assert_eq!(config.engine.device, DevicePreference::Auto);
        assert_eq!(config.engine.default_language, "es");
        assert!(config.engine.split_sentences);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:9999");
    }

    #[test]
    fn test_storage_layout() {
        let config = StorageConfig::default();
        assert_eq!(config.voices_dir(), PathBuf::from("data/voices"));
        assert_eq!(config.index_path(), PathBuf::from("data/voices/index.json"));
    }
}
