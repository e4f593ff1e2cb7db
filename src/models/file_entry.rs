use std::path::PathBuf;
use std::time::SystemTime;

use thiserror::Error;

/// 一个待写入输出文件的条目
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// 相对于扫描根目录的路径（写入头部）
    pub path: PathBuf,

    /// 文件的绝对路径
    pub absolute_path: PathBuf,

    /// 文件大小（字节）
    pub size: u64,

    /// 最后修改时间（平台不支持时为 None）
    pub modified: Option<SystemTime>,

    /// 原始文件内容
    pub content: Vec<u8>,
}

/// 单个文件处理失败的原因，不会中断整个运行
#[derive(Debug, Error)]
pub enum FileError {
    #[error("无法获取文件信息: {0}")]
    Metadata(#[source] std::io::Error),

    #[error("路径不在扫描根目录 {root} 之下")]
    RelativePath { root: PathBuf },

    #[error("无法打开文件: {0}")]
    Open(#[source] std::io::Error),

    #[error("无法读取文件: {0}")]
    Read(#[source] std::io::Error),
}

/// 工作线程产出的结果
#[derive(Debug)]
pub enum WorkerResult {
    /// 成功读取的文件
    Entry(FileEntry),

    /// 处理失败的文件，只用于诊断输出
    Failed { path: PathBuf, error: FileError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_keeps_path_and_message() {
        let result = WorkerResult::Failed {
            path: PathBuf::from("sub/missing.txt"),
            error: FileError::Open(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "gone",
            )),
        };

        if let WorkerResult::Failed { path, error } = result {
            assert_eq!(path, PathBuf::from("sub/missing.txt"));
            assert!(error.to_string().contains("gone"));
        } else {
            panic!("应该是失败结果");
        }
    }
}
