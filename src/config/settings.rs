use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::DefaultConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认输出文件路径
    pub output: String,

    /// 工作任务数，0 表示每个 CPU 一个
    pub workers: usize,

    /// 是否使用单线程顺序模式
    pub sequential: bool,

    /// 是否显示进度
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: DefaultConfig::default_output(),
            workers: DefaultConfig::default_workers(),
            sequential: false,
            show_progress: DefaultConfig::default_show_progress(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {}", path.display()))?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("无法写入配置文件: {}", path.display()))?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("single-gen");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载默认位置的配置，文件不存在时使用默认配置
    pub fn load_or_default() -> Result<Self> {
        match Self::default_config_path() {
            Ok(config_path) if config_path.exists() => Self::load_from_file(&config_path),
            _ => Ok(Self::default()),
        }
    }

    /// 以 TOML 文本形式显示
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
