pub mod config;
pub mod models;
pub mod operations;
pub mod scanner;
pub mod utils;

// 重新导出常用模块
pub use config::Config;
pub use operations::{CombineMode, CombineOptions, CombineSummary, Combiner};
pub use scanner::{FileWalker, IgnoreList, WorkerPool};
