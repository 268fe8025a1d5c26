//! 规则服务入口
//!
//! 提供规则编译、合并、评估与保存的 REST API。

use rule_engine::RuleStore;
use rule_service::{AppState, build_router};
use rule_shared::{config::AppConfig, observability};
use tokio::net::TcpListener;
use tracing::info;

const SERVICE_NAME: &str = "rule-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let _guard = observability::init(&config.service_name, &config.observability).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let state = AppState::new(RuleStore::new());
    let app = build_router(state, &config.cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到 SIGTERM 或 Ctrl+C 时停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
