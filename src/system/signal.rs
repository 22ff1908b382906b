use tokio::signal;
use tracing::{info, warn};

/// 等待 Ctrl+C；监听失败时直接返回，让调用方继续走关闭流程
pub async fn wait_for_shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}
