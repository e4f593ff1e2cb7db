pub mod file_reader;
pub mod file_walker;
pub mod ignore_list;
pub mod worker_pool;

pub use file_reader::FileReader;
pub use file_walker::{FileWalker, WalkAction, WalkedPath};
pub use ignore_list::{IgnoreList, IgnoreStats, PatternFileStatus};
pub use worker_pool::WorkerPool;
