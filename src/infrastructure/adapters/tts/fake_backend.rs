//! Fake Speech Backend - 用于开发和测试的进程内后端
//!
//! 行为与真实引擎对齐:
//! - 参考音频必须是 WAV，否则视为解码失败
//! - 预热后以 speaker 为键记住音色
//! - 未预热的 speaker 直接合成会失败
//!
//! 输出是确定性的正弦波，同样的输入得到同样的字节

use std::collections::HashSet;
use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use super::wav::{encode_wav, is_wav, write_output};
use crate::application::ports::{BackendError, SpeechBackend, SpeechRequest};

/// XTTS-v2 输出采样率
const SAMPLE_RATE: u32 = 24000;
/// 每个字符对应的时长
const MS_PER_CHAR: u64 = 60;
const MIN_DURATION_MS: u64 = 200;
const MAX_DURATION_MS: u64 = 10_000;

/// Fake Speech Backend
#[derive(Debug, Default)]
pub struct FakeSpeechBackend {
    cached_speakers: HashSet<String>,
}

impl FakeSpeechBackend {
    pub fn new() -> Self {
        tracing::info!("FakeSpeechBackend initialized");
        Self::default()
    }

    /// 是否已缓存该 speaker
    pub fn has_speaker(&self, speaker: &str) -> bool {
        self.cached_speakers.contains(speaker)
    }

    fn render(&self, request: &SpeechRequest<'_>) -> Vec<u8> {
        let chars = request.text.chars().count() as u64;
        let duration_ms = (chars * MS_PER_CHAR).clamp(MIN_DURATION_MS, MAX_DURATION_MS);
        let num_samples = (SAMPLE_RATE as u64 * duration_ms / 1000) as usize;

        // 不同 speaker 得到不同音高
        let seed: u32 = request.speaker.bytes().map(u32::from).sum();
        let frequency = 120.0 + (seed % 240) as f32;

        let samples: Vec<i16> = (0..num_samples)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                ((2.0 * PI * frequency * t).sin() * 0.3 * i16::MAX as f32) as i16
            })
            .collect();

        encode_wav(&samples, SAMPLE_RATE)
    }
}

impl SpeechBackend for FakeSpeechBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn tts_to_file(
        &mut self,
        request: &SpeechRequest<'_>,
        output: &Path,
    ) -> Result<(), BackendError> {
        match request.speaker_wav {
            Some(reference) => {
                let data = fs::read(reference)
                    .map_err(|e| BackendError::InvalidReferenceAudio(e.to_string()))?;
                if !is_wav(&data) {
                    return Err(BackendError::InvalidReferenceAudio(format!(
                        "cannot decode {}",
                        reference.display()
                    )));
                }
                self.cached_speakers.insert(request.speaker.to_string());
            }
            None if !self.has_speaker(request.speaker) => {
                return Err(BackendError::SpeakerNotCached(request.speaker.to_string()));
            }
            None => {}
        }

        let audio = self.render(request);
        write_output(output, &audio)?;

        tracing::debug!(
            speaker = %request.speaker,
            language = %request.language,
            audio_size = audio.len(),
            "FakeSpeechBackend: rendered tone"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::tts::wav::test_wav;
    use tempfile::tempdir;

    fn request<'a>(speaker: &'a str, text: &'a str, wav: Option<&'a Path>) -> SpeechRequest<'a> {
        SpeechRequest {
            text,
            language: "en",
            speaker,
            speaker_wav: wav,
            split_sentences: true,
        }
    }

    #[test]
    fn test_warmup_caches_speaker() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("ref.wav");
        fs::write(&reference, test_wav()).unwrap();
        let output = dir.path().join("out/preview.wav");

        let mut backend = FakeSpeechBackend::new();
        backend
            .tts_to_file(&request("v1", "hello", Some(&reference)), &output)
            .unwrap();

        assert!(backend.has_speaker("v1"));
        assert!(is_wav(&fs::read(&output).unwrap()));
    }

    #[test]
    fn test_unknown_speaker_fails() {
        let dir = tempdir().unwrap();
        let mut backend = FakeSpeechBackend::new();

        let err = backend
            .tts_to_file(&request("ghost", "hello", None), &dir.path().join("o.wav"))
            .unwrap_err();
        assert!(matches!(err, BackendError::SpeakerNotCached(_)));
    }

    #[test]
    fn test_non_wav_reference_fails() {
        let dir = tempdir().unwrap();
        let reference = dir.path().join("ref.mp3");
        fs::write(&reference, b"ID3 garbage").unwrap();

        let mut backend = FakeSpeechBackend::new();
        let err = backend
            .tts_to_file(
                &request("v1", "hello", Some(&reference)),
                &dir.path().join("o.wav"),
            )
            .unwrap_err();

        assert!(matches!(err, BackendError::InvalidReferenceAudio(_)));
        assert!(!backend.has_speaker("v1"));
    }

    #[test]
    fn test_output_length_scales_with_text() {
        let backend = FakeSpeechBackend::new();
        let short = backend.render(&request("v1", "hi", None));
        let long = backend.render(&request("v1", &"a".repeat(50), None));

        assert!(long.len() > short.len());
        assert_eq!(short, backend.render(&request("v1", "hi", None)));
    }
}
