//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现，以及把它们组装成引擎的启动代码

pub mod adapters;
pub mod bootstrap;
pub mod http;
pub mod persistence;

pub use bootstrap::{build_engine, BootstrapError};
