//! Domain Layer - 领域层
//!
//! 只有一个限界上下文:
//! - Voice Context: 克隆音色的身份与元数据

pub mod voice;
