use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::models::WorkerResult;
use crate::scanner::FileReader;

/// 固定大小的工作池 - 从路径队列取任务，把读取结果推入结果队列
pub struct WorkerPool {
    reader: FileReader,
    workers: usize,
}

impl WorkerPool {
    /// 创建工作池，大小至少为 1
    pub fn new(reader: FileReader, workers: usize) -> Self {
        Self {
            reader,
            workers: workers.max(1),
        }
    }

    /// 默认工作任务数：每个 CPU 一个
    pub fn default_size() -> usize {
        num_cpus::get()
    }

    pub fn size(&self) -> usize {
        self.workers
    }

    /// 运行所有工作任务直到路径队列关闭并被取空
    ///
    /// 两个队列都应该是有界的：结果队列的容量决定了最多有多少个
    /// 已读入内存但尚未写出的文件。
    ///
    /// 返回时所有工作任务都已退出，结果队列的发送端也已全部释放，
    /// 因此结果队列的消费者一定能结束。返回值是处理过的路径数。
    pub async fn run(
        self,
        paths: mpsc::Receiver<PathBuf>,
        results: mpsc::Sender<WorkerResult>,
    ) -> Result<usize> {
        let paths = Arc::new(Mutex::new(paths));

        let handles: Vec<_> = (0..self.workers)
            .map(|id| {
                let reader = self.reader.clone();
                let paths = paths.clone();
                let results = results.clone();
                tokio::spawn(async move { worker(id, reader, paths, results).await })
            })
            .collect();

        // 只保留工作任务持有的发送端
        drop(results);

        let mut processed = 0;
        for handle in join_all(handles).await {
            processed += handle.context("工作任务异常退出")?;
        }

        Ok(processed)
    }
}

async fn worker(
    id: usize,
    reader: FileReader,
    paths: Arc<Mutex<mpsc::Receiver<PathBuf>>>,
    results: mpsc::Sender<WorkerResult>,
) -> usize {
    let mut processed = 0;

    loop {
        let next = { paths.lock().await.recv().await };
        let Some(path) = next else {
            break;
        };
        processed += 1;

        if let Some(result) = reader.read_async(&path).await {
            // 结果队列已满时在这里等待写入端
            if results.send(result).await.is_err() {
                // 写入端已关闭
                break;
            }
        }
    }

    debug!("工作任务 {} 退出，处理了 {} 个路径", id, processed);
    processed
}
