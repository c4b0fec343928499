//! 转换产物的下载响应。

use axum::body::Body as AxumBody;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use std::path::Path;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::ApiError;

/// 以附件形式流式返回文件。文件在响应后保留在工作目录中。
pub async fn send_artifact(
    path: &Path,
    media_type: &str,
    filename: &str,
) -> Result<Response, ApiError> {
    let file = File::open(path)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let length = file
        .metadata()
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .len();
    let content_type = HeaderValue::from_str(media_type)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let disposition = HeaderValue::from_str(&content_disposition(filename))
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    debug!(path = ?path, media_type, length, "sending artifact");

    let stream = ReaderStream::new(file);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(AxumBody::from_stream(stream))
        .map_err(|err| ApiError::Internal(err.to_string()))
}

/// `attachment; filename="..."`，非 ASCII 名称追加 RFC 5987 `filename*`。
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    if filename.is_ascii() && fallback == filename {
        return format!("attachment; filename=\"{fallback}\"");
    }
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        percent_encode(filename)
    )
}

fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
