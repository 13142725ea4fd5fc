//! Application State
//!
//! 引擎在后台线程上构建，完成前 HTTP 服务已经可以接受请求，
//! 所以状态里放的是一个只能写入一次的槽位

use std::sync::{Arc, OnceLock};

use super::error::ApiError;
use crate::application::VoiceCloneEngine;

/// 引擎槽位，启动时为空，初始化成功后写入一次
#[derive(Clone, Default)]
pub struct EngineSlot {
    inner: Arc<OnceLock<Arc<VoiceCloneEngine>>>,
}

impl EngineSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入引擎；已写入时返回 false
    pub fn set(&self, engine: Arc<VoiceCloneEngine>) -> bool {
        self.inner.set(engine).is_ok()
    }

    pub fn get(&self) -> Option<Arc<VoiceCloneEngine>> {
        self.inner.get().cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// 应用状态
pub struct AppState {
    engine: EngineSlot,
}

impl AppState {
    /// 创建应用状态
    pub fn new(engine: EngineSlot) -> Self {
        Self { engine }
    }

    /// 获取已初始化的引擎
    pub fn engine(&self) -> Result<Arc<VoiceCloneEngine>, ApiError> {
        self.engine.get().ok_or(ApiError::EngineUnavailable)
    }

    pub fn engine_ready(&self) -> bool {
        self.engine.is_ready()
    }
}
