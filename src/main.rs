//! voxclone - 语音克隆 TTS 服务
//!
//! 启动顺序:
//! - 加载配置、初始化日志
//! - HTTP 服务立即开始监听，引擎在 blocking 线程上构建
//! - 引擎就绪前各接口返回 "engine not initialized"

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use voxclone::config::{load_config, print_config, LogConfig};
use voxclone::infrastructure::build_engine;
use voxclone::infrastructure::http::{AppState, EngineSlot, HttpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("voxclone - voice clone TTS service");
    print_config(&config);

    // 确保工作目录存在
    tokio::fs::create_dir_all(&config.storage.work_dir).await?;

    // 后台构建引擎，失败时槽位保持为空
    let slot = EngineSlot::new();
    let engine_slot = slot.clone();
    let engine_config = config.engine.clone();
    let storage_config = config.storage.clone();
    tokio::task::spawn_blocking(move || {
        match build_engine(&engine_config, &storage_config) {
            Ok(engine) => {
                if engine_slot.set(Arc::new(engine)) {
                    tracing::info!("Engine initialized, accepting voice requests");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize voice clone engine");
            }
        }
    });

    let server = HttpServer::new(config.server.clone(), AppState::new(slot));

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先于配置
fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},voxclone={},tower_http=debug", log.level, log.level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
