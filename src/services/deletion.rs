//! 批量删除工作池
//!
//! 固定数量的 worker 从有界队列取任务，对每个短链接调用
//! `ShortLinkStore::soft_delete`。提交方在全部任务入队后立即返回，
//! 不等待处理完成，也不会得到逐条结果：这是一个尽力而为的异步接口。
//! 单个任务没有超时，卡住的后端调用只会拖住一个 worker。

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::link_store::ShortLinkStore;
use crate::config::DeletionConfig;
use crate::errors::{LinkVaultError, Result};

#[derive(Debug, Clone)]
struct DeletionJob {
    short_link: String,
    owner_id: u32,
}

pub struct DeletionPool {
    sender: Mutex<Option<mpsc::Sender<DeletionJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl DeletionPool {
    /// 启动 worker；必须在 tokio runtime 内调用
    pub fn start(store: Arc<ShortLinkStore>, config: &DeletionConfig) -> Self {
        let workers = config.workers.max(1);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let handles = (0..workers)
            .map(|worker_id| {
                let store = Arc::clone(&store);
                let rx = Arc::clone(&rx);
                tokio::spawn(run_worker(worker_id, store, rx))
            })
            .collect();

        info!(
            "Deletion pool started: {} workers, queue capacity {}",
            workers, config.queue_capacity
        );

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
        }
    }

    /// 每个短链接入队一个任务，全部入队后返回
    ///
    /// 队列满时等待空位。返回 Ok 只表示已接受，不表示已删除。
    pub async fn delete_batch_async(&self, short_links: Vec<String>, owner_id: u32) -> Result<()> {
        let sender = self
            .sender
            .lock()
            .await
            .clone()
            .ok_or_else(|| LinkVaultError::unsupported("deletion pool has been shut down"))?;

        let count = short_links.len();
        for short_link in short_links {
            sender
                .send(DeletionJob {
                    short_link,
                    owner_id,
                })
                .await
                .map_err(|_| LinkVaultError::internal("deletion queue closed"))?;
        }

        debug!("Accepted {} deletions for owner {}", count, owner_id);
        Ok(())
    }

    /// 关闭队列并等待 worker 处理完已入队的任务
    pub async fn shutdown(&self) {
        // 丢弃 Sender，队列排空后 worker 的 recv 返回 None
        drop(self.sender.lock().await.take());

        let handles = std::mem::take(&mut *self.workers.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Deletion worker terminated abnormally: {}", e);
            }
        }
        info!("Deletion pool drained");
    }
}

async fn run_worker(
    worker_id: usize,
    store: Arc<ShortLinkStore>,
    rx: Arc<Mutex<mpsc::Receiver<DeletionJob>>>,
) {
    loop {
        // 锁只在取任务时持有
        let job = rx.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        match store.soft_delete(&job.short_link, job.owner_id).await {
            Ok(()) => debug!("Worker {} processed deletion of {}", worker_id, job.short_link),
            Err(e) => error!(
                "Worker {} failed to delete {} for owner {}: {}",
                worker_id, job.short_link, job.owner_id, e
            ),
        }
    }
    debug!("Deletion worker {} stopped", worker_id);
}
