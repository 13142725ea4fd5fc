//! Storage Adapter - 音色产物文件存储

mod file_storage;

pub use file_storage::FileVoiceStorage;
