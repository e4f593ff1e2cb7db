use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "single-gen")]
#[command(about = "把目录树中所有未被忽略的文件合并成一个带注释的文件")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 要扫描的目录
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// 输出文件路径 (默认: combined_output.txt)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 工作任务数 (默认: CPU 核心数)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// 使用单线程顺序模式，按遍历顺序输出
    #[arg(long)]
    pub sequential: bool,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,

    /// 不显示进度和完成提示
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 管理配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 显示当前配置
    Show,

    /// 写入默认配置文件
    Init {
        /// 覆盖已存在的配置文件
        #[arg(short, long)]
        force: bool,
    },
}
