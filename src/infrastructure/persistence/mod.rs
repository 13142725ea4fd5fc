//! Persistence Layer - 数据持久化
//!
//! 音色索引的 JSON 文件实现

mod json_registry;

pub use json_registry::JsonVoiceRegistry;
