use std::fs::Metadata;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::models::{FileEntry, FileError, WorkerResult};
use crate::scanner::IgnoreList;

/// 文件读取器 - 检查忽略规则并完整读取单个文件
#[derive(Clone)]
pub struct FileReader {
    root: PathBuf,
    ignore_list: Arc<IgnoreList>,
}

impl FileReader {
    pub fn new(root: impl Into<PathBuf>, ignore_list: Arc<IgnoreList>) -> Self {
        Self {
            root: root.into(),
            ignore_list,
        }
    }

    /// 同步读取，供顺序模式使用
    ///
    /// 被忽略的路径和目录返回 `None`。
    pub fn read(&self, path: &Path) -> Option<WorkerResult> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => return Some(self.failed(path, FileError::Metadata(err))),
        };

        let relative = match self.accept(path, &metadata) {
            Ok(Some(relative)) => relative,
            Ok(None) => return None,
            Err(err) => return Some(self.failed(path, err)),
        };

        let mut file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) => return Some(self.failed(path, FileError::Open(err))),
        };

        let mut content = Vec::with_capacity(metadata.len() as usize);
        if let Err(err) = file.read_to_end(&mut content) {
            return Some(self.failed(path, FileError::Read(err)));
        }

        Some(Self::entry(path, relative, &metadata, content))
    }

    /// 异步读取，供工作任务使用
    pub async fn read_async(&self, path: &Path) -> Option<WorkerResult> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(err) => return Some(self.failed(path, FileError::Metadata(err))),
        };

        let relative = match self.accept(path, &metadata) {
            Ok(Some(relative)) => relative,
            Ok(None) => return None,
            Err(err) => return Some(self.failed(path, err)),
        };

        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(err) => return Some(self.failed(path, FileError::Open(err))),
        };

        let mut content = Vec::with_capacity(metadata.len() as usize);
        if let Err(err) = file.read_to_end(&mut content).await {
            return Some(self.failed(path, FileError::Read(err)));
        }

        Some(Self::entry(path, relative, &metadata, content))
    }

    /// 计算相对路径并判断是否需要读取
    fn accept(&self, path: &Path, metadata: &Metadata) -> Result<Option<PathBuf>, FileError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| FileError::RelativePath {
                root: self.root.clone(),
            })?
            .to_path_buf();

        if self.ignore_list.should_ignore(&relative, metadata.is_dir()) {
            debug!("忽略: {}", relative.display());
            return Ok(None);
        }

        if metadata.is_dir() {
            return Ok(None);
        }

        // FIFO、套接字、设备文件打开后可能永远阻塞，只读取普通文件
        if !metadata.is_file() {
            debug!("跳过非普通文件: {}", relative.display());
            return Ok(None);
        }

        Ok(Some(relative))
    }

    fn failed(&self, path: &Path, error: FileError) -> WorkerResult {
        let path = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_path_buf();
        WorkerResult::Failed { path, error }
    }

    fn entry(
        path: &Path,
        relative: PathBuf,
        metadata: &Metadata,
        content: Vec<u8>,
    ) -> WorkerResult {
        WorkerResult::Entry(FileEntry {
            path: relative,
            absolute_path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
            content,
        })
    }
}
