use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::errors::LinkVaultError;
use crate::identity::OwnerTokenSigner;
use crate::services::{DeletionPool, ShortLinkStore};

pub struct StartupContext {
    pub config: StaticConfig,
    pub store: Arc<ShortLinkStore>,
    pub deletion_pool: DeletionPool,
    pub signer: OwnerTokenSigner,
}

/// 准备启动上下文
/// 包括存储后端、删除池和身份签名器
pub async fn prepare_startup(config: StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    if config.identity.uses_default_secret() {
        warn!("SECRET_KEY is not set, using the built-in default. Identity tokens are forgeable.");
    }
    let signer = OwnerTokenSigner::from_config(&config.identity);

    let store = Arc::new(
        ShortLinkStore::from_config(&config)
            .await
            .context("Failed to create storage backend")?,
    );

    match store.health_check().await {
        Ok(()) => info!("Storage backend health check passed"),
        Err(LinkVaultError::Unsupported(msg)) => {
            debug!("Storage backend health check skipped: {}", msg)
        }
        Err(e) => return Err(e).context("Storage backend health check failed"),
    }

    let deletion_pool = DeletionPool::start(Arc::clone(&store), &config.deletion);

    info!(
        "Startup completed in {}ms (backend: {}, base url: {})",
        start_time.elapsed().as_millis(),
        store.backend_name().await,
        config.base_url
    );

    Ok(StartupContext {
        config,
        store,
        deletion_pool,
        signer,
    })
}
