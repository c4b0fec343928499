//! AxoConvert server binary.
//!
//! This crate accepts office documents over HTTP, converts them with a
//! headless office process (or the in-process DOCX exporter), and streams
//! the artifacts back. Every log record is also kept in a central store
//! that the `/logs` endpoint reads from.

mod app;
mod background;
mod config;
mod convert;
mod converter;
mod dispatch;
mod docmodel;
mod error;
mod http;
mod logging;
mod logs;
mod logstore;
mod package;
mod pool;
mod postprocess;
mod storage;
#[cfg(test)]
mod test_support;
mod tls;
mod upload;
mod validate;
mod version;

use axum_server::Handle;
use clap::Parser;
use shadow_rs::shadow;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use crate::app::{Services, build_router};
use crate::background::spawn_background_tasks;
use crate::config::Args;
use crate::converter::{Converter, ConverterConfig};
use crate::docmodel::{DocxHtmlExporter, HtmlExportOptions, HtmlExporter};
use crate::logstore::{LogStore, MemoryLogStore};
use crate::pool::ConversionSlots;
use crate::storage::Storage;
use crate::upload::UploadConfig;

shadow!(build);

/// Starts the AxoConvert server and blocks until shutdown.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let args = Args::parse();
    let log_store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new(args.log_capacity));
    logging::init_logging(log_store.clone());

    let storage = Arc::new(Storage::new(
        PathBuf::from(&args.uploads_dir),
        args.workdir_keying,
    ));
    storage.ensure_root().await?;
    let slots = ConversionSlots::new(
        args.max_concurrent_conversions,
        Duration::from_secs(args.conversion_queue_timeout_secs),
    );
    let converter = Arc::new(Converter::new(
        ConverterConfig {
            program: PathBuf::from(&args.converter_bin),
            timeout: Duration::from_secs(args.conversion_timeout_secs),
            isolated_profile: !args.shared_profile,
        },
        slots,
    ));
    let exporter: Arc<dyn HtmlExporter> =
        Arc::new(DocxHtmlExporter::new(HtmlExportOptions::default()));
    let services = Services {
        storage: storage.clone(),
        upload: Arc::new(UploadConfig {
            max_size: args.upload_max_size,
        }),
        converter,
        exporter,
        logs: log_store,
    };
    let app = build_router(services, args.cors_origins.as_deref());

    let host = args
        .host
        .parse::<IpAddr>()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let http_addr = SocketAddr::new(host, args.http_port);
    let tls_config = tls::build_rustls_config(&args).await?;
    let handle = Handle::new();

    info!(
        uploads_dir = %args.uploads_dir,
        converter = %args.converter_bin,
        keying = ?args.workdir_keying,
        max_concurrent = args.max_concurrent_conversions,
        "conversion service configured"
    );
    info!("Starting HTTP server at {}", http_addr);

    let http_server = axum_server::bind(http_addr)
        .handle(handle.clone())
        .serve(app.clone().into_make_service_with_connect_info::<SocketAddr>());
    let https_server = async {
        match (tls_config, args.https_port) {
            (Some(tls_config), Some(port)) => {
                let https_addr = SocketAddr::new(host, port);
                info!("Starting HTTPS server at {}", https_addr);
                axum_server::bind_rustls(https_addr, tls_config)
                    .handle(handle.clone())
                    .serve(app.into_make_service_with_connect_info::<SocketAddr>())
                    .await
            }
            _ => std::future::pending().await,
        }
    };

    spawn_background_tasks(storage, Duration::from_secs(args.workdir_ttl_secs));
    tokio::select! {
        result = http_server => result?,
        result = https_server => result?,
        _ = shutdown_signal(handle.clone()) => {}
    }

    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received termination signal, shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
