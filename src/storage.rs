use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::ErrorKind;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{SOURCE_DIR_NAME, WorkdirKeying};

/// 上传工作目录的根，按文件名主干（或请求）分配子目录。
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
    keying: WorkdirKeying,
}

/// 单次转换请求使用的工作目录。
#[derive(Clone, Debug)]
pub struct Workdir {
    pub path: PathBuf,
    pub stem: String,
}

impl Workdir {
    /// 上传原件的路径，位于 `source/` 子目录，与转换产物分开。
    pub fn source_path(&self, file_name: &str) -> PathBuf {
        self.path.join(SOURCE_DIR_NAME).join(file_name)
    }
}

impl Storage {
    pub fn new(root: PathBuf, keying: WorkdirKeying) -> Self {
        Self { root, keying }
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// 为上传文件创建（或复用）工作目录。
    pub async fn prepare_workdir(&self, file_name: &str) -> Result<Workdir, StorageError> {
        let file_name = checked_file_name(file_name)?;
        let stem = file_stem(file_name);
        if stem.is_empty() {
            return Err(StorageError::InvalidPath);
        }
        let dir_name = match self.keying {
            WorkdirKeying::Stem => stem.to_string(),
            WorkdirKeying::Request => format!("{stem}-{}", Uuid::new_v4().simple()),
        };
        let target = self.resolve_path_checked(&dir_name, true).await?;
        let reused = fs::metadata(&target).await.is_ok();
        fs::create_dir_all(&target).await?;
        self.ensure_no_symlink_components(&target, false).await?;
        fs::create_dir_all(target.join(SOURCE_DIR_NAME)).await?;
        if reused {
            debug!(path = ?target, "reusing existing working directory");
        } else {
            debug!(path = ?target, "created working directory");
        }
        Ok(Workdir {
            path: target,
            stem: stem.to_string(),
        })
    }

    pub async fn resolve_path_checked(
        &self,
        relative: &str,
        allow_missing_leaf: bool,
    ) -> Result<PathBuf, StorageError> {
        let target = self.resolve(relative)?;
        self.ensure_no_symlink_components(&target, allow_missing_leaf)
            .await?;
        Ok(target)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let mut normalized = PathBuf::new();
        let trimmed = relative.trim_start_matches(['/', '\\']);
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(segment) => normalized.push(segment),
                Component::CurDir => continue,
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::InvalidPath);
                }
            }
        }
        if normalized.as_os_str().is_empty() {
            return Err(StorageError::InvalidPath);
        }

        Ok(self.root.join(normalized))
    }

    async fn ensure_no_symlink_components(
        &self,
        target: &Path,
        allow_missing_leaf: bool,
    ) -> Result<(), StorageError> {
        let relative = target
            .strip_prefix(&self.root)
            .map_err(|_| StorageError::InvalidPath)?;
        let mut current = PathBuf::from(&self.root);
        let mut components = relative.components().peekable();

        while let Some(component) = components.next() {
            current.push(component.as_os_str());
            match fs::symlink_metadata(&current).await {
                Ok(metadata) => {
                    if metadata.file_type().is_symlink() {
                        return Err(StorageError::InvalidPath);
                    }
                    if components.peek().is_some() && !metadata.is_dir() {
                        return Err(StorageError::InvalidPath);
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound && allow_missing_leaf => {
                    return Ok(());
                }
                Err(err) => return Err(StorageError::Io(err)),
            }
        }

        Ok(())
    }

    /// 删除修改时间早于 `ttl` 的工作目录，返回删除数量。
    pub async fn remove_stale_workdirs(&self, ttl: std::time::Duration) -> io::Result<usize> {
        if ttl.is_zero() || fs::metadata(&self.root).await.is_err() {
            return Ok(0);
        }

        let now = SystemTime::now();
        let mut removed = 0;
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_dir() {
                continue;
            }
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let Ok(age) = now.duration_since(modified) else {
                continue;
            };
            if age < ttl {
                continue;
            }
            let path = entry.path();
            match fs::remove_dir_all(&path).await {
                Ok(()) => {
                    info!(path = ?path, "removed stale working directory");
                    removed += 1;
                }
                Err(err) => warn!(path = ?path, error = %err, "failed to remove stale working directory"),
            }
        }
        Ok(removed)
    }
}

/// 去掉最后一个扩展名；没有 `.` 时返回原名。
pub fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

/// 上传文件名必须是单个普通路径分量。
pub fn checked_file_name(file_name: &str) -> Result<&str, StorageError> {
    let trimmed = file_name.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidPath);
    }
    let mut components = Path::new(trimmed).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(trimmed),
        _ => Err(StorageError::InvalidPath),
    }
}

#[derive(Debug)]
pub enum StorageError {
    InvalidPath,
    Io(io::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}
