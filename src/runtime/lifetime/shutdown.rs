use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info};

use super::startup::StartupContext;
use crate::system::signal::wait_for_shutdown_signal;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

pub async fn listen_for_shutdown(context: &StartupContext) {
    wait_for_shutdown_signal().await;
    info!("Draining deletion queue...");

    match timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        context.deletion_pool.shutdown(),
    )
    .await
    {
        Ok(()) => info!("All shutdown tasks completed successfully"),
        Err(_) => error!(
            "Deletion queue drain timed out after {} seconds, pending deletions are lost",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
