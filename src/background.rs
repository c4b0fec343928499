//! 工作目录过期清理的后台任务。

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::WORKDIR_CLEAN_INTERVAL_SECS;
use crate::storage::Storage;

/// 启动后台任务。`workdir_ttl` 为零时产物永久保留，不启动清理。
pub fn spawn_background_tasks(storage: Arc<Storage>, workdir_ttl: Duration) {
    if workdir_ttl.is_zero() {
        return;
    }

    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(WORKDIR_CLEAN_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match storage.remove_stale_workdirs(workdir_ttl).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "removed stale working directories"),
                Err(err) => warn!(error = %err, "working directory cleanup failed"),
            }
        }
    });
}
