//! 转换请求的上传接收：类型校验、分配工作目录、流式写盘。

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::storage::{Storage, Workdir, checked_file_name};
use crate::validate::AcceptedTypes;

const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub struct UploadConfig {
    pub max_size: u64,
}

/// 已落盘的上传文件及其工作目录。
#[derive(Debug)]
pub struct ReceivedUpload {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub workdir: Workdir,
    pub source: PathBuf,
}

/// 读取 `file` 字段：先校验声明类型，通过后才写入磁盘。
pub async fn receive_upload(
    storage: &Storage,
    upload: &UploadConfig,
    accepted: AcceptedTypes,
    mut multipart: Multipart,
) -> Result<ReceivedUpload, ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        accepted.check(field.content_type())?;
        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("file name is required".into()))?;
        let file_name = checked_file_name(&file_name)?.to_string();

        let workdir = storage.prepare_workdir(&file_name).await?;
        let source = workdir.source_path(&file_name);
        let size = write_field(&mut field, &source, upload.max_size).await?;
        info!(
            file_name = %file_name,
            content_type = %content_type,
            size,
            workdir = ?workdir.path,
            "saved uploaded file"
        );
        return Ok(ReceivedUpload {
            file_name,
            content_type,
            size,
            workdir,
            source,
        });
    }

    Err(ApiError::BadRequest("file is required".into()))
}

async fn write_field(field: &mut Field<'_>, target: &Path, max_size: u64) -> Result<u64, ApiError> {
    let mut file = File::create(target)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let mut total_written: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                drop(file);
                let _ = fs::remove_file(target).await;
                return Err(ApiError::BadRequest(format!("failed to read upload: {err}")));
            }
        };
        if chunk.is_empty() {
            continue;
        }
        total_written += chunk.len() as u64;
        if max_size > 0 && total_written > max_size {
            warn!(path = ?target, max_size, "upload exceeds size limit");
            drop(file);
            let _ = fs::remove_file(target).await;
            return Err(ApiError::BadRequest("upload size exceeds limit".into()));
        }
        file.write_all(&chunk)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;
    }
    file.flush()
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    debug!(path = ?target, bytes = total_written, "upload written");
    Ok(total_written)
}
