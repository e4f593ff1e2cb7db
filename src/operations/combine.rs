use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::operations::{CombineSummary, EntryWriter};
use crate::scanner::{FileReader, FileWalker, IgnoreList, WalkAction, WalkedPath, WorkerPool};
use crate::utils::format_now;

/// 路径队列中每个工作任务对应的容量
const PATH_QUEUE_PER_WORKER: usize = 4;

/// 合并模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    /// 单线程，按遍历顺序写入
    Sequential,
    /// 工作池并发读取，按完成顺序写入
    Concurrent { workers: usize },
}

/// 一次合并运行的完整设置
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// 扫描根目录（按用户给出的形式写入头部）
    pub root: PathBuf,

    /// 输出文件路径
    pub output: PathBuf,

    /// 合并模式
    pub mode: CombineMode,

    /// 是否显示进度
    pub show_progress: bool,
}

impl CombineOptions {
    pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: output.into(),
            mode: CombineMode::Concurrent {
                workers: WorkerPool::default_size(),
            },
            show_progress: false,
        }
    }

    pub fn mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// 合并器 - 串联遍历、读取与写入
pub struct Combiner {
    options: CombineOptions,
}

impl Combiner {
    pub fn new(options: CombineOptions) -> Self {
        Self { options }
    }

    /// 执行合并
    ///
    /// 输出文件创建失败、路径解析失败或遍历出错时返回错误；
    /// 单个文件的错误只记录日志，不影响结果。
    pub async fn run(&self) -> Result<CombineSummary> {
        let options = &self.options;

        let root_metadata = std::fs::metadata(&options.root)
            .with_context(|| format!("无法访问扫描目录: {}", options.root.display()))?;
        if !root_metadata.is_dir() {
            bail!("不是目录: {}", options.root.display());
        }

        let output_file = File::create(&options.output)
            .with_context(|| format!("无法创建输出文件: {}", options.output.display()))?;

        let root = std::fs::canonicalize(&options.root)
            .with_context(|| format!("无法解析扫描目录: {}", options.root.display()))?;
        let output = std::fs::canonicalize(&options.output)
            .with_context(|| format!("无法解析输出文件路径: {}", options.output.display()))?;

        info!("开始合并 {} -> {}", root.display(), output.display());

        let ignore_list = Arc::new(IgnoreList::load(&root));
        debug!("忽略规则: {:?}", ignore_list.stats());

        let mut writer = EntryWriter::new(BufWriter::new(output_file))
            .with_progress(self.create_progress_bar());
        writer
            .write_header(&options.root.display().to_string(), &format_now())
            .context("无法写入输出文件头部")?;

        let walker = FileWalker::new(&root).exclude_path(output);
        let reader = FileReader::new(&root, ignore_list.clone());

        let summary = match options.mode {
            CombineMode::Sequential => {
                tokio::task::spawn_blocking(move || {
                    Self::run_sequential(walker, reader, ignore_list, writer)
                })
                .await
                .context("顺序合并任务异常退出")??
            }
            CombineMode::Concurrent { workers } => {
                Self::run_concurrent(walker, reader, ignore_list, writer, workers).await?
            }
        };

        info!(
            "合并完成：写入 {} 个文件（{} 字节），{} 个文件出错",
            summary.files_written, summary.bytes_written, summary.files_failed
        );

        Ok(summary)
    }

    /// 顺序模式：遍历、检查、读取、写入都在同一个线程里按遍历顺序完成
    fn run_sequential(
        walker: FileWalker,
        reader: FileReader,
        ignore_list: Arc<IgnoreList>,
        mut writer: EntryWriter<BufWriter<File>>,
    ) -> Result<CombineSummary> {
        let root = walker.root().to_path_buf();

        walker.walk(|walked| {
            if walked.is_dir {
                return Ok(prune_ignored_dir(&root, walked, &ignore_list));
            }
            if let Some(result) = reader.read(&walked.path) {
                writer.write_result(result);
            }
            Ok(WalkAction::Continue)
        })?;

        let (_, summary) = writer.finish()?;
        Ok(summary)
    }

    /// 并发模式：一个遍历任务，N 个工作任务，一个写入任务
    async fn run_concurrent(
        walker: FileWalker,
        reader: FileReader,
        ignore_list: Arc<IgnoreList>,
        mut writer: EntryWriter<BufWriter<File>>,
        workers: usize,
    ) -> Result<CombineSummary> {
        let pool = WorkerPool::new(reader, workers);

        // 已读入但未写出的文件最多约为工作任务数的两倍
        let path_capacity = pool.size() * PATH_QUEUE_PER_WORKER;
        let (path_tx, path_rx) = mpsc::channel::<PathBuf>(path_capacity);
        let (result_tx, mut result_rx) = mpsc::channel(pool.size());

        // 写入任务是结果队列唯一的消费者
        let writer_task = tokio::task::spawn_blocking(move || {
            while let Some(result) = result_rx.blocking_recv() {
                writer.write_result(result);
            }
            writer.finish()
        });

        // 遍历结束时 path_tx 被释放，路径队列随之关闭
        let walk_task = tokio::task::spawn_blocking(move || {
            let root = walker.root().to_path_buf();
            walker.walk(|walked| {
                if walked.is_dir {
                    let action = prune_ignored_dir(&root, walked, &ignore_list);
                    if action == WalkAction::SkipSubtree {
                        return Ok(action);
                    }
                }
                if path_tx.blocking_send(walked.path.clone()).is_err() {
                    return Ok(WalkAction::Stop);
                }
                Ok(WalkAction::Continue)
            })
        });

        debug!("启动 {} 个工作任务", pool.size());
        let pool_result = pool.run(path_rx, result_tx).await;

        let walk_result = walk_task.await.context("遍历任务异常退出")?;
        let writer_result = writer_task.await.context("写入任务异常退出")?;

        walk_result?;
        let processed = pool_result?;
        let (_, summary) = writer_result?;
        debug!("工作池共处理 {} 个路径", processed);

        Ok(summary)
    }

    /// 创建进度条（在测试时禁用）
    fn create_progress_bar(&self) -> ProgressBar {
        if cfg!(test) || !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        pb.set_style(style);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// 被忽略的目录整体跳过，不再进入
fn prune_ignored_dir(root: &Path, walked: &WalkedPath, ignore_list: &IgnoreList) -> WalkAction {
    let relative = walked.path.strip_prefix(root).unwrap_or(&walked.path);
    if ignore_list.should_ignore(relative, true) {
        WalkAction::SkipSubtree
    } else {
        WalkAction::Continue
    }
}
