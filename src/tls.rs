//! TLS 证书加载。

use axum_server::tls_rustls::RustlsConfig;
use std::io;
use tracing::info;

use crate::config::Args;

/// 配置了 HTTPS 端口时加载 PEM 证书与私钥；未配置端口返回 `None`。
pub async fn build_rustls_config(args: &Args) -> io::Result<Option<RustlsConfig>> {
    if args.https_port.is_none() {
        return Ok(None);
    }
    let (Some(cert), Some(key)) = (&args.tls_cert, &args.tls_key) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "--https-port requires --tls-cert and --tls-key",
        ));
    };
    let config = RustlsConfig::from_pem_file(cert, key).await?;
    info!(cert = %cert, "loaded TLS certificate");
    Ok(Some(config))
}
