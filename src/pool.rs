//! 转换并发槽位：限制同时运行的外部转换数量。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time;
use tracing::{debug, warn};

use crate::converter::ConversionError;

/// 限制并发转换数量；排队超过 `queue_timeout` 的请求放弃等待。
#[derive(Debug)]
pub struct ConversionSlots {
    semaphore: Arc<Semaphore>,
    limit: usize,
    queue_timeout: Duration,
}

impl ConversionSlots {
    /// `limit == 0` 表示不限制。
    pub fn new(limit: usize, queue_timeout: Duration) -> Self {
        let permits = if limit == 0 {
            Semaphore::MAX_PERMITS
        } else {
            limit
        };
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            limit,
            queue_timeout,
        }
    }

    /// 在排队超时内获取槽位，超时返回 `Busy`。
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, ConversionError> {
        let retry_after = self.queue_timeout.as_secs().max(1);
        if self.queue_timeout.is_zero() {
            return self.semaphore.clone().try_acquire_owned().map_err(|_| {
                warn!(limit = self.limit, "conversion slots exhausted");
                ConversionError::Busy(retry_after)
            });
        }

        match time::timeout(self.queue_timeout, self.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => {
                debug!(available = self.available(), "conversion slot acquired");
                Ok(permit)
            }
            Ok(Err(_)) => Err(ConversionError::Busy(retry_after)),
            Err(_) => {
                warn!(
                    limit = self.limit,
                    waited_secs = self.queue_timeout.as_secs(),
                    "timed out waiting for a conversion slot"
                );
                Err(ConversionError::Busy(retry_after))
            }
        }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
