//! 数据库调用超时控制
//!
//! 持有读写锁期间的数据库调用必须有上限，否则一个卡住的连接会拖住
//! 整个存储层。这里不做重试，重试策略属于调用方。

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::errors::{LinkVaultError, Result};

/// 在 `limit` 内执行 `operation`，超时返回 Timeout，其余错误附带操作名
pub async fn with_deadline<T, E, Fut>(operation_name: &str, limit: Duration, operation: Fut) -> Result<T>
where
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Into<LinkVaultError>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into().with_context(operation_name)),
        Err(_elapsed) => {
            warn!(
                "Operation '{}' timed out after {}ms",
                operation_name,
                limit.as_millis()
            );
            Err(LinkVaultError::timeout(format!(
                "Operation '{}' timed out after {}ms",
                operation_name,
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[tokio::test]
    async fn test_success_passes_through() {
        let result = with_deadline("op", Duration::from_secs(1), async { Ok::<_, DbErr>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_error_gets_context() {
        let result = with_deadline("get(abc)", Duration::from_secs(1), async {
            Err::<(), _>(DbErr::Custom("boom".to_string()))
        })
        .await;
        match result {
            Err(LinkVaultError::DatabaseOperation(msg)) => assert!(msg.starts_with("get(abc): ")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_error_is_backend_unavailable() {
        let result = with_deadline("ping", Duration::from_secs(1), async {
            Err::<(), _>(DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
                "connection refused".to_string(),
            )))
        })
        .await;
        assert!(matches!(result, Err(LinkVaultError::BackendUnavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_is_timeout() {
        let result = with_deadline("slow", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, DbErr>(())
        })
        .await;
        assert!(matches!(result, Err(LinkVaultError::Timeout(_))));
    }
}
