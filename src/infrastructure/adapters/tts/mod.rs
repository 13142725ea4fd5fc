//! TTS Adapter - 语音合成后端实现

mod fake_backend;
mod wav;
mod xtts_http_backend;

pub use fake_backend::FakeSpeechBackend;
pub use wav::{encode_wav, is_wav};
pub use xtts_http_backend::{XttsHttpBackend, XttsHttpBackendConfig};

#[cfg(test)]
pub(crate) use wav::test_wav;
