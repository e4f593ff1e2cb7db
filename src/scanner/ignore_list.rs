use std::path::{Component, Path};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

/// 根目录下的 Git 忽略文件
pub const GITIGNORE_FILE: &str = ".gitignore";

/// 本工具专用的忽略文件
pub const SINGLEGEN_IGNORE_FILE: &str = ".singlegenignore";

/// 无论忽略文件写了什么都会被排除的路径组件
const ALWAYS_IGNORED: [&str; 4] = [".git", GITIGNORE_FILE, SINGLEGEN_IGNORE_FILE, ".DS_Store"];

/// 单个忽略文件的加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFileStatus {
    /// 文件不存在
    Missing,
    /// 已加载
    Loaded,
    /// 文件存在但解析失败，规则被丢弃
    Invalid,
}

/// 忽略规则加载统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreStats {
    pub gitignore: PatternFileStatus,
    pub singlegen_ignore: PatternFileStatus,
}

/// 忽略列表 - 合并 .gitignore、.singlegenignore 和内置排除规则
///
/// 构造完成后不再修改，可以通过 `Arc` 在多个工作任务之间共享。
#[derive(Debug)]
pub struct IgnoreList {
    git_ignore: Option<Gitignore>,
    single_ignore: Option<Gitignore>,
    stats: IgnoreStats,
}

impl IgnoreList {
    /// 从扫描根目录加载两个忽略文件
    ///
    /// 文件不存在不算错误；文件存在但无法解析时记录警告并忽略该文件的规则。
    pub fn load(root: &Path) -> Self {
        let (git_ignore, gitignore_status) = Self::load_pattern_file(root, GITIGNORE_FILE);
        let (single_ignore, single_status) = Self::load_pattern_file(root, SINGLEGEN_IGNORE_FILE);

        Self {
            git_ignore,
            single_ignore,
            stats: IgnoreStats {
                gitignore: gitignore_status,
                singlegen_ignore: single_status,
            },
        }
    }

    /// 只包含内置排除规则的忽略列表
    pub fn empty() -> Self {
        Self {
            git_ignore: None,
            single_ignore: None,
            stats: IgnoreStats {
                gitignore: PatternFileStatus::Missing,
                singlegen_ignore: PatternFileStatus::Missing,
            },
        }
    }

    /// 加载统计
    pub fn stats(&self) -> IgnoreStats {
        self.stats
    }

    /// 检查相对于根目录的路径是否应该被忽略
    pub fn should_ignore(&self, relative_path: &Path, is_dir: bool) -> bool {
        if Self::is_always_ignored(relative_path) {
            return true;
        }

        if let Some(git_ignore) = &self.git_ignore {
            if git_ignore
                .matched_path_or_any_parents(relative_path, is_dir)
                .is_ignore()
            {
                return true;
            }
        }

        if let Some(single_ignore) = &self.single_ignore {
            if single_ignore
                .matched_path_or_any_parents(relative_path, is_dir)
                .is_ignore()
            {
                return true;
            }
        }

        false
    }

    fn is_always_ignored(relative_path: &Path) -> bool {
        relative_path.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|name| ALWAYS_IGNORED.contains(&name)),
            _ => false,
        })
    }

    fn load_pattern_file(root: &Path, file_name: &str) -> (Option<Gitignore>, PatternFileStatus) {
        let pattern_path = root.join(file_name);
        if !pattern_path.is_file() {
            debug!("未找到忽略文件: {}", pattern_path.display());
            return (None, PatternFileStatus::Missing);
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&pattern_path) {
            warn!("无法解析 {}，已跳过其中的规则: {}", pattern_path.display(), err);
            return (None, PatternFileStatus::Invalid);
        }

        match builder.build() {
            Ok(gitignore) => {
                debug!(
                    "已加载 {}: {} 条忽略规则, {} 条排除规则",
                    pattern_path.display(),
                    gitignore.num_ignores(),
                    gitignore.num_whitelists()
                );
                (Some(gitignore), PatternFileStatus::Loaded)
            }
            Err(err) => {
                warn!("无法编译 {}，已跳过其中的规则: {}", pattern_path.display(), err);
                (None, PatternFileStatus::Invalid)
            }
        }
    }
}
