//! 外部文档转换引擎调用：无界面办公套件子进程，或进程内导出器。
//!
//! 转换器不会返回输出路径，调用方按 `<输入主干>.<目标扩展名>` 约定重建。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PROFILE_TEMP_DIR;
use crate::docmodel::{ExportError, HtmlExporter};
use crate::pool::ConversionSlots;
use crate::storage::file_stem;

/// LibreOffice 打开 PDF 时使用 Writer 导入过滤器。
pub const PDF_IMPORT_FILTER: &str = "writer_pdf_import";

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{0}")]
    Failed(String),
    #[error("document export failed: {0}")]
    Export(#[from] ExportError),
    #[error("conversion timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("expected output {} is missing", .0.display())]
    ArtifactMissing(PathBuf),
    #[error("conversion slots exhausted")]
    Busy(u64),
    #[error("failed to start converter: {0}")]
    Spawn(std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("conversion task aborted: {0}")]
    Join(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetFormat {
    Pdf,
    Docx,
    Html,
}

impl TargetFormat {
    /// `--convert-to` 参数。
    pub fn filter(self) -> &'static str {
        match self {
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
            TargetFormat::Html => "html:HTML:EmbedImages",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Pdf => "pdf",
            TargetFormat::Docx => "docx",
            TargetFormat::Html => "html",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            TargetFormat::Pdf => "application/pdf",
            TargetFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            TargetFormat::Html => "text/html",
        }
    }
}

/// 一次外部转换的输入、输出目录与目标格式。
#[derive(Clone, Copy, Debug)]
pub struct ConversionJob<'a> {
    pub input: &'a Path,
    pub outdir: &'a Path,
    pub target: TargetFormat,
    pub input_filter: Option<&'static str>,
}

impl<'a> ConversionJob<'a> {
    pub fn new(input: &'a Path, outdir: &'a Path, target: TargetFormat) -> Self {
        Self {
            input,
            outdir,
            target,
            input_filter: None,
        }
    }

    pub fn with_input_filter(mut self, filter: &'static str) -> Self {
        self.input_filter = Some(filter);
        self
    }

    /// 按约定推算转换器写出的文件路径。
    pub fn expected_output(&self) -> PathBuf {
        let name = self
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.outdir
            .join(format!("{}.{}", file_stem(&name), self.target.extension()))
    }
}

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub program: PathBuf,
    pub timeout: Duration,
    pub isolated_profile: bool,
}

#[derive(Debug)]
pub struct Converter {
    config: ConverterConfig,
    slots: ConversionSlots,
}

impl Converter {
    pub fn new(config: ConverterConfig, slots: ConversionSlots) -> Self {
        Self { config, slots }
    }

    /// 运行外部转换器并返回推算的输出路径（不检查是否存在）。
    ///
    /// 输出路径上的旧文件在启动前删除，之后存在的文件只能来自本次转换。
    pub async fn convert(&self, job: ConversionJob<'_>) -> Result<PathBuf, ConversionError> {
        let expected = job.expected_output();
        if expected == job.input {
            return Err(ConversionError::Failed(format!(
                "output {} would overwrite the input",
                expected.display()
            )));
        }
        let _permit = self.slots.acquire().await?;
        remove_stale_output(&expected).await?;
        let profile = self.create_profile_dir().await?;
        let result = self.run(&job, profile.as_deref()).await;
        if let Some(dir) = profile
            && let Err(err) = fs::remove_dir_all(&dir).await
        {
            debug!(path = ?dir, error = %err, "failed to remove converter profile");
        }
        result?;
        Ok(expected)
    }

    async fn run(&self, job: &ConversionJob<'_>, profile: Option<&Path>) -> Result<(), ConversionError> {
        let args = build_args(job, profile);
        debug!(
            program = ?self.config.program,
            args = ?args,
            "running converter"
        );
        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ConversionError::Spawn)?;

        let started = Instant::now();
        let output = if self.config.timeout.is_zero() {
            child.wait_with_output().await?
        } else {
            match time::timeout(self.config.timeout, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    warn!(
                        input = ?job.input,
                        timeout_secs = self.config.timeout.as_secs(),
                        "converter timed out, killed"
                    );
                    return Err(ConversionError::Timeout(self.config.timeout));
                }
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            error!(
                input = ?job.input,
                status = %output.status,
                stderr,
                "converter exited with failure"
            );
            let mut message = format!(
                "{} returned {}",
                self.config.program.display(),
                output.status
            );
            if !stderr.is_empty() {
                message.push_str(": ");
                message.push_str(stderr);
            }
            return Err(ConversionError::Failed(message));
        }

        info!(
            input = ?job.input,
            target = job.target.extension(),
            elapsed_ms,
            "converter finished"
        );
        Ok(())
    }

    /// 在阻塞线程中运行进程内导出器，同样受槽位与超时约束。
    pub async fn export_in_process(
        &self,
        exporter: Arc<dyn HtmlExporter>,
        input: PathBuf,
        output: PathBuf,
    ) -> Result<PathBuf, ConversionError> {
        if output == input {
            return Err(ConversionError::Failed(format!(
                "output {} would overwrite the input",
                output.display()
            )));
        }
        let permit = self.slots.acquire().await?;
        remove_stale_output(&output).await?;
        let started = Instant::now();
        // 超时无法中断阻塞线程，槽位随任务真正结束才归还。
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            exporter.export(&input, &output).map(|()| output)
        });
        let joined = if self.config.timeout.is_zero() {
            task.await
        } else {
            match time::timeout(self.config.timeout, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        timeout_secs = self.config.timeout.as_secs(),
                        "in-process export timed out"
                    );
                    return Err(ConversionError::Timeout(self.config.timeout));
                }
            }
        };
        let output = joined.map_err(|err| ConversionError::Join(err.to_string()))??;
        info!(
            output = ?output,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "in-process export finished"
        );
        Ok(output)
    }

    async fn create_profile_dir(&self) -> Result<Option<PathBuf>, ConversionError> {
        if !self.config.isolated_profile {
            return Ok(None);
        }
        let dir = std::env::temp_dir()
            .join(PROFILE_TEMP_DIR)
            .join(Uuid::new_v4().simple().to_string());
        fs::create_dir_all(&dir).await?;
        Ok(Some(dir))
    }
}

async fn remove_stale_output(path: &Path) -> Result<(), ConversionError> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = ?path, "removed stale output before conversion");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ConversionError::Io(err)),
    }
}

fn build_args(job: &ConversionJob<'_>, profile: Option<&Path>) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if let Some(profile) = profile {
        args.push(format!("-env:UserInstallation=file://{}", profile.display()).into());
    }
    args.push("--headless".into());
    if let Some(filter) = job.input_filter {
        args.push(format!("--infilter={filter}").into());
    }
    args.push("--convert-to".into());
    args.push(job.target.filter().into());
    args.push("--outdir".into());
    args.push(job.outdir.as_os_str().to_owned());
    args.push(job.input.as_os_str().to_owned());
    args
}
