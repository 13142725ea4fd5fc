//! XTTS HTTP Backend - 调用 XTTS-v2 推理 sidecar
//!
//! 实现 SpeechBackend trait。调用已经在 worker 线程上、Gateway 锁内执行，
//! 所以这里使用阻塞版 reqwest 客户端。
//!
//! Sidecar API:
//! POST {url}/tts_to_file  (multipart)
//!   text, language, speaker, split_sentences, device, model_name
//!   speaker_wav (文件，可选；只在预热时提供)
//! Response: audio/wav binary
//!
//! GET {url}/health

use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;

use super::wav::write_output;
use crate::application::ports::{BackendError, SpeechBackend, SpeechRequest};
use crate::application::Device;

/// XTTS HTTP 后端配置
#[derive(Debug, Clone)]
pub struct XttsHttpBackendConfig {
    /// Sidecar 基础 URL
    pub base_url: String,
    /// 模型名称
    pub model_name: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for XttsHttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8020".to_string(),
            model_name: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
            timeout_secs: 600,
        }
    }
}

impl XttsHttpBackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// XTTS HTTP 后端
pub struct XttsHttpBackend {
    client: Client,
    config: XttsHttpBackendConfig,
    device: Device,
}

impl XttsHttpBackend {
    /// 创建新的后端
    pub fn new(config: XttsHttpBackendConfig, device: Device) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            device,
        })
    }

    /// 推理 URL
    fn synthesize_url(&self) -> String {
        format!("{}/tts_to_file", self.config.base_url.trim_end_matches('/'))
    }

    /// 健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }

    /// 检查 sidecar 是否可用
    pub fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn build_form(&self, request: &SpeechRequest<'_>) -> Result<Form, BackendError> {
        let form = Form::new()
            .text("text", request.text.to_string())
            .text("language", request.language.to_string())
            .text("speaker", request.speaker.to_string())
            .text("split_sentences", request.split_sentences.to_string())
            .text("device", self.device.as_str())
            .text("model_name", self.config.model_name.clone());

        match request.speaker_wav {
            Some(reference) => form
                .file("speaker_wav", reference)
                .map_err(|e| BackendError::InvalidReferenceAudio(e.to_string())),
            None => Ok(form),
        }
    }
}

impl SpeechBackend for XttsHttpBackend {
    fn name(&self) -> &'static str {
        "xtts_http"
    }

    fn tts_to_file(
        &mut self,
        request: &SpeechRequest<'_>,
        output: &Path,
    ) -> Result<(), BackendError> {
        let form = self.build_form(request)?;

        tracing::debug!(
            url = %self.synthesize_url(),
            speaker = %request.speaker,
            with_reference = request.speaker_wav.is_some(),
            text_len = request.text.len(),
            "Sending XTTS request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else if e.is_connect() {
                    BackendError::NetworkError(format!("Cannot connect to XTTS service: {}", e))
                } else {
                    BackendError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND if request.speaker_wav.is_none() => {
                    BackendError::SpeakerNotCached(request.speaker.to_string())
                }
                _ => BackendError::ServiceError(format!("HTTP {}: {}", status, error_text)),
            });
        }

        let audio = response
            .bytes()
            .map_err(|e| BackendError::ServiceError(format!("Failed to read audio: {}", e)))?;
        if audio.is_empty() {
            return Err(BackendError::ServiceError("Empty audio response".to_string()));
        }

        write_output(output, &audio)
    }
}
