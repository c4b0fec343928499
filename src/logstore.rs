//! 集中日志存储：推入表头的有序列表，以及把 tracing 事件写入其中的 Layer。

use chrono::Local;
use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("log store unavailable: {0}")]
    Unavailable(String),
}

/// 追加与区间读取的有序日志列表，最新记录位于索引 0。
pub trait LogStore: Send + Sync {
    fn push(&self, record: String) -> Result<(), LogStoreError>;

    /// 闭区间 `[start, stop]`，越界部分截断。
    fn range(&self, start: usize, stop: usize) -> Result<Vec<String>, LogStoreError>;
}

/// 有容量上限的内存实现，超出后丢弃最旧记录。
#[derive(Debug)]
pub struct MemoryLogStore {
    records: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl MemoryLogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity,
        }
    }
}

impl LogStore for MemoryLogStore {
    fn push(&self, record: String) -> Result<(), LogStoreError> {
        let mut records = self
            .records
            .lock()
            .map_err(|err| LogStoreError::Unavailable(err.to_string()))?;
        records.push_front(record);
        if self.capacity > 0 {
            records.truncate(self.capacity);
        }
        Ok(())
    }

    fn range(&self, start: usize, stop: usize) -> Result<Vec<String>, LogStoreError> {
        let records = self
            .records
            .lock()
            .map_err(|err| LogStoreError::Unavailable(err.to_string()))?;
        if start > stop {
            return Ok(Vec::new());
        }
        Ok(records
            .iter()
            .skip(start)
            .take(stop - start + 1)
            .cloned()
            .collect())
    }
}

/// 把每条 tracing 事件格式化后推入 `LogStore`。推入失败只写 stderr 并计数。
pub struct LogSinkLayer {
    store: Arc<dyn LogStore>,
    dropped: Arc<AtomicU64>,
}

impl LogSinkLayer {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self {
            store,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S: Subscriber> Layer<S> for LogSinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);
        let record = format!(
            "{} - {} - {}{}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            event.metadata().level(),
            visitor.message,
            visitor.fields
        );
        if let Err(err) = self.store.push(record) {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            eprintln!("failed to push log record ({dropped} dropped): {err}");
        }
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: String,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info};
    use tracing_subscriber::layer::SubscriberExt;

    struct UnreachableStore;

    impl LogStore for UnreachableStore {
        fn push(&self, _record: String) -> Result<(), LogStoreError> {
            Err(LogStoreError::Unavailable("connection refused".into()))
        }

        fn range(&self, _start: usize, _stop: usize) -> Result<Vec<String>, LogStoreError> {
            Err(LogStoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn range_reads_newest_first() {
        let store = MemoryLogStore::new(0);
        for index in 0..5 {
            store.push(format!("record {index}")).expect("push");
        }
        assert_eq!(
            store.range(0, 2).expect("range"),
            vec!["record 4", "record 3", "record 2"]
        );
        assert_eq!(store.range(3, 100).expect("range").len(), 2);
        assert!(store.range(4, 1).expect("range").is_empty());
    }

    #[test]
    fn capacity_drops_oldest_records() {
        let store = MemoryLogStore::new(3);
        for index in 0..5 {
            store.push(format!("record {index}")).expect("push");
        }
        assert_eq!(
            store.range(0, 10).expect("range"),
            vec!["record 4", "record 3", "record 2"]
        );
    }

    #[test]
    fn layer_formats_events() {
        let store = Arc::new(MemoryLogStore::new(100));
        let subscriber =
            tracing_subscriber::registry().with(LogSinkLayer::new(store.clone()));
        tracing::subscriber::with_default(subscriber, || {
            info!(file_name = "report.docx", size = 42, "saved uploaded file");
            error!("conversion failed");
        });

        let records = store.range(0, 10).expect("range");
        assert_eq!(records.len(), 2);
        assert!(records[0].ends_with(" - ERROR - conversion failed"), "{}", records[0]);
        assert!(
            records[1].ends_with(" - INFO - saved uploaded file file_name=report.docx size=42"),
            "{}",
            records[1]
        );
        let timestamp = records[1].split(" - ").next().expect("timestamp");
        assert_eq!(timestamp.len(), "2024-01-01 00:00:00,000".len());
        assert_eq!(&timestamp[19..20], ",");
    }

    #[test]
    fn store_failures_never_reach_the_caller() {
        let layer = LogSinkLayer::new(Arc::new(UnreachableStore));
        let dropped = layer.dropped.clone();
        let subscriber = tracing_subscriber::registry().with(layer);
        let result = tracing::subscriber::with_default(subscriber, || {
            info!("first");
            info!("second");
            7
        });
        assert_eq!(result, 7);
        assert_eq!(dropped.load(Ordering::Relaxed), 2);
    }
}
