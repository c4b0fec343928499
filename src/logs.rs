//! 日志查询处理器。

use axum::extract::Extension;
use axum::response::Json as JsonResponse;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::config::LOGS_READ_LIMIT;
use crate::error::ApiError;
use crate::logstore::LogStore;

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    logs: Vec<String>,
}

/// 返回最近的日志记录，窗口内按时间先后排列。
pub async fn get_logs(
    Extension(store): Extension<Arc<dyn LogStore>>,
) -> Result<JsonResponse<LogsResponse>, ApiError> {
    let mut logs = store.range(0, LOGS_READ_LIMIT - 1).map_err(|err| {
        error!(error = %err, "error fetching logs");
        ApiError::Internal("Error fetching logs".into())
    })?;
    logs.reverse();
    Ok(JsonResponse(LogsResponse { logs }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logstore::{LogStoreError, MemoryLogStore};

    struct BrokenStore;

    impl LogStore for BrokenStore {
        fn push(&self, _record: String) -> Result<(), LogStoreError> {
            Ok(())
        }

        fn range(&self, _start: usize, _stop: usize) -> Result<Vec<String>, LogStoreError> {
            Err(LogStoreError::Unavailable("timeout".into()))
        }
    }

    #[tokio::test]
    async fn returns_latest_window_in_chronological_order() {
        let store = Arc::new(MemoryLogStore::new(0));
        for index in 0..60 {
            store.push(format!("line {index}")).expect("push");
        }
        let store: Arc<dyn LogStore> = store;

        let JsonResponse(response) = get_logs(Extension(store)).await.expect("logs");
        assert_eq!(response.logs.len(), LOGS_READ_LIMIT);
        assert_eq!(response.logs.first().map(String::as_str), Some("line 10"));
        assert_eq!(response.logs.last().map(String::as_str), Some("line 59"));
    }

    #[tokio::test]
    async fn store_error_is_internal() {
        let store: Arc<dyn LogStore> = Arc::new(BrokenStore);
        let result = get_logs(Extension(store)).await;
        assert!(matches!(result, Err(ApiError::Internal(msg)) if msg == "Error fetching logs"));
    }
}
