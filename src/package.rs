//! 转换产物打包：多文件输出压缩为 ZIP，单文件输出直接定位。

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::config::BUNDLE_FILE_NAME;
use crate::converter::ConversionError;

/// 允许进入 ZIP 的扩展名（小写比较）。
pub const BUNDLE_EXTENSIONS: &[&str] = &["html", "gif", "png"];

/// 确认单文件产物存在。转换器正常退出但未写出文件时返回 `ArtifactMissing`。
pub async fn single_file(expected: PathBuf) -> Result<PathBuf, ConversionError> {
    match fs::metadata(&expected).await {
        Ok(metadata) if metadata.is_file() => Ok(expected),
        Ok(_) => Err(ConversionError::ArtifactMissing(expected)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = ?expected, "expected conversion output is missing");
            Err(ConversionError::ArtifactMissing(expected))
        }
        Err(err) => Err(ConversionError::Io(err)),
    }
}

/// 把工作目录中允许的文件打包，`primary` 必须存在。返回 ZIP 路径。
pub async fn bundle(workdir: &Path, primary: PathBuf) -> Result<PathBuf, ConversionError> {
    single_file(primary).await?;

    let mut members = Vec::new();
    let mut dir = fs::read_dir(workdir).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() || !is_bundle_member(&path) {
            continue;
        }
        members.push(path);
    }
    members.sort();

    let archive = workdir.join(BUNDLE_FILE_NAME);
    let archive_for_task = archive.clone();
    let count = members.len();
    tokio::task::spawn_blocking(move || write_archive(&archive_for_task, &members))
        .await
        .map_err(|err| ConversionError::Join(err.to_string()))??;
    info!(archive = ?archive, files = count, "bundle created");
    Ok(archive)
}

/// 删除工作目录顶层上次留下的打包成员与 ZIP，返回删除数量。
pub async fn clear_bundle_outputs(workdir: &Path) -> Result<usize, ConversionError> {
    let mut removed = 0;
    let mut dir = fs::read_dir(workdir).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if is_bundle_member(&path) || entry.file_name() == BUNDLE_FILE_NAME {
            fs::remove_file(&path).await?;
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(workdir = ?workdir, removed, "cleared previous bundle outputs");
    }
    Ok(removed)
}

fn is_bundle_member(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            BUNDLE_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn write_archive(archive: &Path, members: &[PathBuf]) -> io::Result<()> {
    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for member in members {
        let Some(name) = member.file_name().map(|name| name.to_string_lossy().into_owned())
        else {
            continue;
        };
        let data = std::fs::read(member)?;
        zip.start_file(name.as_str(), options).map_err(io::Error::other)?;
        zip.write_all(&data)?;
        debug!(file = name, "added file to bundle");
    }
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn archive_names(path: &Path) -> Vec<String> {
        let file = File::open(path).expect("open archive");
        let mut archive = ZipArchive::new(file).expect("read archive");
        let mut names = Vec::new();
        for index in 0..archive.len() {
            names.push(archive.by_index(index).expect("entry").name().to_string());
        }
        names.sort();
        names
    }

    #[tokio::test]
    async fn bundle_only_includes_allow_listed_files() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        std::fs::write(dir.join("report.docx"), b"source").expect("write source");
        std::fs::write(dir.join("report.html"), b"<html></html>").expect("write html");
        std::fs::write(dir.join("report_html_1.PNG"), b"png").expect("write png");
        std::fs::write(dir.join("report_html_2.gif"), b"gif").expect("write gif");
        std::fs::write(dir.join("notes.txt"), b"tmp").expect("write txt");
        std::fs::create_dir_all(dir.join("nested.html")).expect("create dir");

        let archive = bundle(dir, dir.join("report.html")).await.expect("bundle");
        assert_eq!(archive, dir.join(BUNDLE_FILE_NAME));
        assert_eq!(
            archive_names(&archive),
            vec!["report.html", "report_html_1.PNG", "report_html_2.gif"]
        );

        let file = File::open(&archive).expect("open archive");
        let mut zip = ZipArchive::new(file).expect("read archive");
        let mut html = String::new();
        zip.by_name("report.html")
            .expect("html entry")
            .read_to_string(&mut html)
            .expect("read html");
        assert_eq!(html, "<html></html>");
    }

    #[tokio::test]
    async fn bundle_skips_source_directory() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        std::fs::create_dir_all(dir.join("source")).expect("create source dir");
        std::fs::write(dir.join("source").join("page.html"), b"upload").expect("write upload");
        std::fs::write(dir.join("page.html"), b"converted").expect("write html");

        let archive = bundle(dir, dir.join("page.html")).await.expect("bundle");
        assert_eq!(archive_names(&archive), vec!["page.html"]);
    }

    #[tokio::test]
    async fn clear_removes_previous_outputs_only() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        std::fs::create_dir_all(dir.join("source")).expect("create source dir");
        std::fs::write(dir.join("source").join("report.docx"), b"upload").expect("write upload");
        std::fs::write(dir.join("report.html"), b"old").expect("write html");
        std::fs::write(dir.join("report_html_1.png"), b"old").expect("write png");
        std::fs::write(dir.join(BUNDLE_FILE_NAME), b"old").expect("write zip");
        std::fs::write(dir.join("report.pdf"), b"pdf").expect("write pdf");

        assert_eq!(clear_bundle_outputs(dir).await.expect("clear"), 3);
        assert!(!dir.join("report.html").exists());
        assert!(!dir.join(BUNDLE_FILE_NAME).exists());
        assert!(dir.join("report.pdf").exists());
        assert!(dir.join("source").join("report.docx").exists());
    }

    #[tokio::test]
    async fn bundle_without_primary_is_missing_artifact() {
        let temp = tempdir().expect("tempdir");
        std::fs::write(temp.path().join("stray.png"), b"png").expect("write png");

        let result = bundle(temp.path(), temp.path().join("report.html")).await;
        assert!(matches!(result, Err(ConversionError::ArtifactMissing(_))));
        assert!(!temp.path().join(BUNDLE_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn single_file_reports_missing_output() {
        let temp = tempdir().expect("tempdir");
        let expected = temp.path().join("report.pdf");
        assert!(matches!(
            single_file(expected.clone()).await,
            Err(ConversionError::ArtifactMissing(path)) if path == expected
        ));

        std::fs::write(&expected, b"%PDF").expect("write pdf");
        assert_eq!(single_file(expected.clone()).await.expect("present"), expected);
    }
}
