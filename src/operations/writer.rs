use std::io::{self, Write};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::warn;

use crate::models::{FileEntry, WorkerResult};
use crate::utils::format_time;

/// 一次合并运行的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombineSummary {
    /// 写入输出文件的条目数
    pub files_written: usize,

    /// 读取或写入失败而被跳过的文件数
    pub files_failed: usize,

    /// 写入的文件内容字节数（不含头部）
    pub bytes_written: u64,
}

/// 条目写入器 - 输出流的唯一持有者
pub struct EntryWriter<W: Write> {
    out: W,
    summary: CombineSummary,
    progress: ProgressBar,
}

impl<W: Write> EntryWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: CombineSummary::default(),
            progress: ProgressBar::hidden(),
        }
    }

    /// 每写入一个条目推进一次进度条
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// 写入输出文件顶部的元数据
    pub fn write_header(&mut self, source_dir: &str, generated: &str) -> io::Result<()> {
        write!(
            self.out,
            "# Combined File Contents\n# Generated: {}\n# Source Directory: {}\n\n",
            generated, source_dir
        )
    }

    /// 写入一个工作结果；失败结果只记录诊断信息
    pub fn write_result(&mut self, result: WorkerResult) {
        match result {
            WorkerResult::Entry(entry) => {
                if let Err(err) = self.write_entry(&entry) {
                    warn!("写入 {} 时出错: {}", entry.path.display(), err);
                    self.summary.files_failed += 1;
                    return;
                }
                self.summary.files_written += 1;
                self.summary.bytes_written += entry.content.len() as u64;
                self.progress.inc(1);
                self.progress.set_message(format!(
                    "已写入 {} 个文件 | {}",
                    self.summary.files_written,
                    entry.path.display()
                ));
            }
            WorkerResult::Failed { path, error } => {
                warn!("处理 {} 时出错: {}", path.display(), error);
                self.summary.files_failed += 1;
            }
        }
    }

    fn write_entry(&mut self, entry: &FileEntry) -> io::Result<()> {
        let modified = entry
            .modified
            .map(format_time)
            .unwrap_or_else(|| "unknown".to_string());

        write!(
            self.out,
            "\n### File: {}\n### Size: {} bytes\n### Last Modified: {}\n\n",
            entry.path.display(),
            entry.size,
            modified
        )?;
        self.out.write_all(&entry.content)?;
        self.out.write_all(b"\n")
    }

    /// 刷新输出流并返回统计
    pub fn finish(mut self) -> Result<(W, CombineSummary)> {
        self.out.flush().context("无法刷新输出文件")?;
        self.progress.finish_and_clear();
        Ok((self.out, self.summary))
    }
}
