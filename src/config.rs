//! CLI arguments and server configuration defaults.

use clap::{Parser, ValueEnum};
use shadow_rs::formatcp;

use crate::build;

const VERSION_INFO: &str = formatcp!(
    r#"{}\ncommit_hash: {}\nbuild_time: {}\nbuild_env: {},{}"#,
    build::PKG_VERSION,
    build::SHORT_COMMIT,
    build::BUILD_TIME,
    build::RUST_VERSION,
    build::RUST_CHANNEL
);

pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_CONVERTER_BIN: &str = "libreoffice";
pub const DEFAULT_CONVERSION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_CONCURRENT_CONVERSIONS: usize = 4;
pub const DEFAULT_CONVERSION_QUEUE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_MAX_SIZE: u64 = 100 * 1024 * 1024;
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;
pub const DEFAULT_WORKDIR_TTL_SECS: u64 = 0;
pub const LOGS_READ_LIMIT: usize = 50;
pub const WORKDIR_CLEAN_INTERVAL_SECS: u64 = 900;
pub const BUNDLE_FILE_NAME: &str = "converted_files.zip";
pub const SOURCE_DIR_NAME: &str = "source";
pub const PROFILE_TEMP_DIR: &str = "axo-convert-profiles";

/// 工作目录命名策略。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum WorkdirKeying {
    /// `<stem>`：同名上传共享目录。
    Stem,
    /// `<stem>-<uuid>`：每个请求独立目录。
    #[default]
    Request,
}

/// CLI arguments and environment configuration for the server.
#[derive(Parser, Debug)]
#[command(name = "axo-convert", version = VERSION_INFO, about = "AxoConvert document conversion server")]
pub struct Args {
    #[arg(
        short = 'u',
        long,
        env = "AXO_UPLOADS_DIR",
        default_value = DEFAULT_UPLOADS_DIR,
        help = "Base directory for per-upload working directories"
    )]
    pub uploads_dir: String,
    #[arg(
        short = 'b',
        long = "bind",
        env = "AXO_BIND",
        default_value = "0.0.0.0",
        help = "Bind address for HTTP/HTTPS"
    )]
    pub host: String,
    #[arg(
        short = 'p',
        long,
        env = "AXO_HTTP_PORT",
        default_value_t = DEFAULT_HTTP_PORT,
        help = "HTTP port"
    )]
    pub http_port: u16,
    #[arg(
        short = 'P',
        long,
        env = "AXO_HTTPS_PORT",
        help = "HTTPS port (requires --tls-cert and --tls-key)"
    )]
    pub https_port: Option<u16>,
    #[arg(short = 'c', long, env = "AXO_TLS_CERT", help = "TLS cert path")]
    pub tls_cert: Option<String>,
    #[arg(short = 'k', long, env = "AXO_TLS_KEY", help = "TLS key path")]
    pub tls_key: Option<String>,
    #[arg(
        long,
        env = "AXO_CORS_ORIGINS",
        default_value = "*",
        help = "Comma separated CORS origins (* mirrors any origin)"
    )]
    pub cors_origins: Option<String>,
    #[arg(
        long,
        env = "AXO_CONVERTER_BIN",
        default_value = DEFAULT_CONVERTER_BIN,
        help = "Headless office executable used for conversions"
    )]
    pub converter_bin: String,
    #[arg(
        long,
        env = "AXO_CONVERSION_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONVERSION_TIMEOUT_SECS,
        help = "Timeout for a single conversion in seconds (0 to disable)"
    )]
    pub conversion_timeout_secs: u64,
    #[arg(
        long,
        env = "AXO_MAX_CONCURRENT_CONVERSIONS",
        default_value_t = DEFAULT_MAX_CONCURRENT_CONVERSIONS,
        help = "Max concurrent conversions (0 to disable)"
    )]
    pub max_concurrent_conversions: usize,
    #[arg(
        long,
        env = "AXO_CONVERSION_QUEUE_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONVERSION_QUEUE_TIMEOUT_SECS,
        help = "Max seconds a request waits for a conversion slot"
    )]
    pub conversion_queue_timeout_secs: u64,
    #[arg(
        long,
        env = "AXO_SHARED_PROFILE",
        help = "Let all conversions share the converter's default user profile"
    )]
    pub shared_profile: bool,
    #[arg(
        long,
        env = "AXO_WORKDIR_KEYING",
        value_enum,
        default_value_t = WorkdirKeying::Request,
        help = "How working directories are named"
    )]
    pub workdir_keying: WorkdirKeying,
    #[arg(
        long,
        env = "AXO_UPLOAD_MAX_SIZE",
        default_value_t = DEFAULT_UPLOAD_MAX_SIZE,
        help = "Max upload size in bytes (0 to disable)"
    )]
    pub upload_max_size: u64,
    #[arg(
        long,
        env = "AXO_LOG_CAPACITY",
        default_value_t = DEFAULT_LOG_CAPACITY,
        help = "Max log records kept for /logs"
    )]
    pub log_capacity: usize,
    #[arg(
        long,
        env = "AXO_WORKDIR_TTL_SECS",
        default_value_t = DEFAULT_WORKDIR_TTL_SECS,
        help = "Remove working directories older than this many seconds (0 to keep forever)"
    )]
    pub workdir_ttl_secs: u64,
}
