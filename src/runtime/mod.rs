//! 进程生命周期：启动、等待信号、关闭

pub mod lifetime;

use anyhow::Result;

use crate::config::StaticConfig;

/// 启动存储和删除池，阻塞直到收到关闭信号并排空删除队列
pub async fn run(config: StaticConfig) -> Result<()> {
    let context = lifetime::startup::prepare_startup(config).await?;
    lifetime::shutdown::listen_for_shutdown(&context).await;
    Ok(())
}
