//! Inference Gateway - 推理后端串行化访问
//!
//! 持有唯一的 SpeechBackend 实例。后端不是并发安全的，
//! 所有调用都在同一把互斥锁下执行，排队顺序不保证公平。

use serde::Deserialize;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::application::ports::{BackendError, SpeechBackend, SpeechRequest};
use crate::domain::voice::Language;

/// 设备偏好（配置项）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    #[default]
    Auto,
    Cuda,
    Cpu,
}

/// 实际使用的执行设备，进程生命周期内固定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    /// 根据偏好选择设备；`auto` 时探测 NVIDIA 设备
    pub fn resolve(preference: DevicePreference) -> Self {
        match preference {
            DevicePreference::Cuda => Device::Cuda,
            DevicePreference::Cpu => Device::Cpu,
            DevicePreference::Auto => {
                if cuda_available() {
                    Device::Cuda
                } else {
                    Device::Cpu
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn cuda_available() -> bool {
    let visible = std::env::var("CUDA_VISIBLE_DEVICES")
        .map(|v| {
            let v = v.trim();
            !v.is_empty() && v != "-1"
        })
        .unwrap_or(false);

    visible || Path::new("/dev/nvidia0").exists()
}

/// Inference Gateway
pub struct InferenceGateway {
    backend: Mutex<Box<dyn SpeechBackend>>,
    device: Device,
    split_sentences: bool,
}

impl InferenceGateway {
    /// 选择设备并构建后端
    ///
    /// 设备只在这里选择一次，`build` 收到的就是整个进程使用的设备
    pub fn open<F>(
        preference: DevicePreference,
        split_sentences: bool,
        build: F,
    ) -> Result<Self, BackendError>
    where
        F: FnOnce(Device) -> Result<Box<dyn SpeechBackend>, BackendError>,
    {
        let device = Device::resolve(preference);
        let backend = build(device)?;

        tracing::info!(
            backend = backend.name(),
            device = %device,
            split_sentences,
            "InferenceGateway initialized"
        );

        Ok(Self {
            backend: Mutex::new(backend),
            device,
            split_sentences,
        })
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// 预热：用参考音频合成，并让后端以 `speaker_key` 缓存音色表征
    ///
    /// 这是唯一传入参考音频的调用
    pub fn warmup_and_cache(
        &self,
        reference_audio: &Path,
        speaker_key: &str,
        text: &str,
        language: &Language,
        output: &Path,
    ) -> Result<(), BackendError> {
        let request = SpeechRequest {
            text,
            language: language.as_str(),
            speaker: speaker_key,
            speaker_wav: Some(reference_audio),
            split_sentences: self.split_sentences,
        };
        self.call("warmup", &request, output)
    }

    /// 只用已缓存的 `speaker_key` 合成，不再传参考音频
    ///
    /// Gateway 不记录哪些键已缓存；键未知时由后端报错
    pub fn synthesize_cached(
        &self,
        speaker_key: &str,
        text: &str,
        language: &Language,
        output: &Path,
    ) -> Result<(), BackendError> {
        let request = SpeechRequest {
            text,
            language: language.as_str(),
            speaker: speaker_key,
            speaker_wav: None,
            split_sentences: self.split_sentences,
        };
        self.call("synthesize", &request, output)
    }

    fn call(
        &self,
        operation: &'static str,
        request: &SpeechRequest<'_>,
        output: &Path,
    ) -> Result<(), BackendError> {
        let queued_at = Instant::now();
        // 后端调用中 panic 不应让后续请求永远失败
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        let waited_ms = queued_at.elapsed().as_millis() as u64;

        let started_at = Instant::now();
        let result = backend.tts_to_file(request, output);
        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        drop(backend);

        match &result {
            Ok(()) => tracing::info!(
                operation,
                speaker = %request.speaker,
                language = %request.language,
                text_len = request.text.len(),
                waited_ms,
                elapsed_ms,
                "Inference call completed"
            ),
            Err(e) => tracing::error!(
                operation,
                speaker = %request.speaker,
                error = %e,
                waited_ms,
                elapsed_ms,
                "Inference call failed"
            ),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    /// 记录同时进入后端的调用数
    struct CountingBackend {
        active: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
        calls: Arc<Mutex<Vec<(String, bool)>>>,
    }

    impl SpeechBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn tts_to_file(
            &mut self,
            request: &SpeechRequest<'_>,
            output: &Path,
        ) -> Result<(), BackendError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.calls
                .lock()
                .unwrap()
                .push((request.speaker.to_string(), request.speaker_wav.is_some()));
            std::fs::write(output, b"RIFF").map_err(|e| BackendError::IoError(e.to_string()))?;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counting_gateway() -> (
        InferenceGateway,
        Arc<AtomicUsize>,
        Arc<Mutex<Vec<(String, bool)>>>,
    ) {
        let max_seen = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let backend = CountingBackend {
            active: Arc::new(AtomicUsize::new(0)),
            max_seen: max_seen.clone(),
            calls: calls.clone(),
        };
        let gateway = InferenceGateway::open(DevicePreference::Cpu, true, |_| {
            Ok(Box::new(backend) as Box<dyn SpeechBackend>)
        })
        .unwrap();
        (gateway, max_seen, calls)
    }

    #[test]
    fn test_device_preference_is_honored() {
        assert_eq!(Device::resolve(DevicePreference::Cpu), Device::Cpu);
        assert_eq!(Device::resolve(DevicePreference::Cuda), Device::Cuda);
    }

    #[test]
    fn test_device_is_passed_to_builder() {
        let mut seen = None;
        let gateway = InferenceGateway::open(DevicePreference::Cuda, false, |device| {
            seen = Some(device);
            Ok(Box::new(CountingBackend {
                active: Arc::new(AtomicUsize::new(0)),
                max_seen: Arc::new(AtomicUsize::new(0)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }) as Box<dyn SpeechBackend>)
        })
        .unwrap();

        assert_eq!(seen, Some(Device::Cuda));
        assert_eq!(gateway.device(), Device::Cuda);
    }

    #[test]
    fn test_only_warmup_passes_reference_audio() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, _, calls) = counting_gateway();
        let lang = Language::parse("en").unwrap();

        gateway
            .warmup_and_cache(
                &dir.path().join("ref.wav"),
                "v1",
                "hello",
                &lang,
                &dir.path().join("preview.wav"),
            )
            .unwrap();
        gateway
            .synthesize_cached("v1", "again", &lang, &dir.path().join("out.wav"))
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("v1".to_string(), true), ("v1".to_string(), false)]
        );
    }

    #[test]
    fn test_calls_are_mutually_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let (gateway, max_seen, calls) = counting_gateway();
        let gateway = Arc::new(gateway);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gateway = gateway.clone();
                let output = dir.path().join(format!("out_{}.wav", i));
                thread::spawn(move || {
                    let lang = Language::parse("es").unwrap();
                    gateway
                        .synthesize_cached(&format!("v{}", i), "hola", &lang, &output)
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(calls.lock().unwrap().len(), 8);
    }
}
