//! 日志初始化：环境变量过滤、标准输出，以及集中日志存储。

use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logstore::{LogSinkLayer, LogStore};

/// 集中日志存储的过滤规则环境变量，默认记录本服务的 debug 日志。
pub const SINK_FILTER_ENV: &str = "AXO_LOG_SINK_FILTER";

/// 初始化 tracing 日志订阅。标准输出沿用 `RUST_LOG`，集中存储单独过滤。
pub fn init_logging(store: Arc<dyn LogStore>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .with(LogSinkLayer::new(store).with_filter(sink_filter()))
        .init();
}

fn sink_filter() -> EnvFilter {
    EnvFilter::try_from_env(SINK_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{}=debug", env!("CARGO_CRATE_NAME"))))
}
