//! 转换路由处理器：上传 → 工作目录 → 转换 → 打包 → 下载。

use axum::extract::{Extension, Multipart};
use axum::response::{Json as JsonResponse, Response};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::BUNDLE_FILE_NAME;
use crate::converter::{ConversionJob, Converter, PDF_IMPORT_FILTER, TargetFormat};
use crate::dispatch::send_artifact;
use crate::docmodel::HtmlExporter;
use crate::error::ApiError;
use crate::package::{bundle, clear_bundle_outputs, single_file};
use crate::postprocess::strip_evaluation_warning_file;
use crate::storage::Storage;
use crate::upload::{UploadConfig, receive_upload};
use crate::validate::{DOCX_ONLY, DOCX_OR_DOC, PDF_ONLY};

const ZIP_MEDIA_TYPE: &str = "application/zip";

#[derive(Serialize)]
pub struct WelcomeMessage {
    message: &'static str,
}

pub async fn welcome_v1() -> JsonResponse<WelcomeMessage> {
    debug!("base route for v1 accessed");
    JsonResponse(WelcomeMessage {
        message: "Welcome to the document upload and conversion service! (v1)",
    })
}

pub async fn welcome_v2() -> JsonResponse<WelcomeMessage> {
    debug!("base route for v2 accessed");
    JsonResponse(WelcomeMessage {
        message: "Welcome to the document upload and conversion service! (v2)",
    })
}

/// DOCX/DOC → HTML，HTML 与图片打包为 ZIP。
pub async fn docx_to_html_bundle(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    Extension(converter): Extension<Arc<Converter>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    debug!("received DOCX to HTML bundle request");
    let result = async {
        let received = receive_upload(&storage, &upload, DOCX_OR_DOC, multipart).await?;
        clear_bundle_outputs(&received.workdir.path).await?;
        let job = ConversionJob::new(&received.source, &received.workdir.path, TargetFormat::Html);
        let html = converter.convert(job).await?;
        let archive = bundle(&received.workdir.path, html).await?;
        info!(stem = %received.workdir.stem, "DOCX to HTML bundle ready");
        send_artifact(&archive, ZIP_MEDIA_TYPE, BUNDLE_FILE_NAME).await
    }
    .await;
    log_failure("docx2html", result)
}

/// DOCX → PDF。
pub async fn docx_to_pdf(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    Extension(converter): Extension<Arc<Converter>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    debug!("received DOCX to PDF conversion request");
    let result = async {
        let received = receive_upload(&storage, &upload, DOCX_ONLY, multipart).await?;
        let job = ConversionJob::new(&received.source, &received.workdir.path, TargetFormat::Pdf);
        let pdf = single_file(converter.convert(job).await?).await?;
        info!(stem = %received.workdir.stem, "DOCX to PDF conversion ready");
        let name = format!("{}.pdf", received.workdir.stem);
        send_artifact(&pdf, TargetFormat::Pdf.media_type(), &name).await
    }
    .await;
    log_failure("docx2pdf", result)
}

/// PDF → DOCX，使用 Writer 的 PDF 导入过滤器。
pub async fn pdf_to_docx(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    Extension(converter): Extension<Arc<Converter>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    debug!("received PDF to DOCX conversion request");
    let result = async {
        let received = receive_upload(&storage, &upload, PDF_ONLY, multipart).await?;
        let job = ConversionJob::new(&received.source, &received.workdir.path, TargetFormat::Docx)
            .with_input_filter(PDF_IMPORT_FILTER);
        let docx = single_file(converter.convert(job).await?).await?;
        info!(stem = %received.workdir.stem, "PDF to DOCX conversion ready");
        let name = format!("{}.docx", received.workdir.stem);
        send_artifact(&docx, TargetFormat::Docx.media_type(), &name).await
    }
    .await;
    log_failure("pdf2docx", result)
}

/// PDF → DOCX → HTML。第二步以中间 DOCX 为输入。
pub async fn pdf_to_html(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    Extension(converter): Extension<Arc<Converter>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    debug!("received PDF to HTML conversion request");
    let result = async {
        let received = receive_upload(&storage, &upload, PDF_ONLY, multipart).await?;
        let workdir = &received.workdir.path;
        let job = ConversionJob::new(&received.source, workdir, TargetFormat::Docx)
            .with_input_filter(PDF_IMPORT_FILTER);
        let docx = single_file(converter.convert(job).await?).await?;
        debug!(path = ?docx, "intermediate DOCX ready");

        let job = ConversionJob::new(&docx, workdir, TargetFormat::Html);
        let html = single_file(converter.convert(job).await?).await?;
        info!(stem = %received.workdir.stem, "PDF to HTML conversion ready");
        let name = format!("{}.html", received.workdir.stem);
        send_artifact(&html, TargetFormat::Html.media_type(), &name).await
    }
    .await;
    log_failure("pdf2html", result)
}

/// DOCX → 单文件 HTML（进程内导出），移除评估水印。
pub async fn docx_to_html_inline(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    Extension(converter): Extension<Arc<Converter>>,
    Extension(exporter): Extension<Arc<dyn HtmlExporter>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    debug!("received in-process DOCX to HTML request");
    let result = async {
        let received = receive_upload(&storage, &upload, DOCX_ONLY, multipart).await?;
        let name = format!("{}.html", received.workdir.stem);
        let output = received.workdir.path.join(&name);
        let html = converter
            .export_in_process(exporter, received.source.clone(), output)
            .await?;
        let html = single_file(html).await?;
        let removed = strip_evaluation_warning_file(&html)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        info!(stem = %received.workdir.stem, removed, "in-process HTML export ready");
        send_artifact(&html, TargetFormat::Html.media_type(), &name).await
    }
    .await;
    log_failure("v2 docx2html", result)
}

fn log_failure(route: &'static str, result: Result<Response, ApiError>) -> Result<Response, ApiError> {
    if let Err(err) = &result {
        error!(route, status = err.status().as_u16(), error = %err, "conversion request failed");
    }
    result
}
