mod cli;

use anyhow::{bail, Result};
use clap::Parser;

use cli::{Cli, Commands, ConfigAction};
use single_gen::config::Config;
use single_gen::operations::{CombineMode, CombineOptions, Combiner};
use single_gen::scanner::WorkerPool;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，诊断信息写到 stderr
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Some(Commands::Config { action }) => run_config_action(action, &cli),
        None => run_combine(&cli, &load_config(&cli)?).await,
    }
}

/// 加载配置
fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(config_path) => Config::load_from_file(config_path),
        None => Config::load_or_default(),
    }
}

async fn run_combine(cli: &Cli, config: &Config) -> Result<()> {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.output.clone().into());

    let mode = if cli.sequential || config.sequential {
        CombineMode::Sequential
    } else {
        let workers = match cli.workers.unwrap_or(config.workers) {
            0 => WorkerPool::default_size(),
            n => n,
        };
        CombineMode::Concurrent { workers }
    };

    let options = CombineOptions::new(&cli.dir, &output)
        .mode(mode)
        .show_progress(config.show_progress && !cli.quiet);

    Combiner::new(options).run().await?;

    if !cli.quiet {
        println!("Successfully combined files into: {}", output.display());
    }

    Ok(())
}

fn run_config_action(action: &ConfigAction, cli: &Cli) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", load_config(cli)?.to_toml()?);
        }
        ConfigAction::Init { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::default_config_path()?,
            };
            if path.exists() && !*force {
                bail!("配置文件已存在: {} (使用 --force 覆盖)", path.display());
            }
            Config::default().save_to_file(&path)?;
            println!("已写入默认配置: {}", path.display());
        }
    }

    Ok(())
}
