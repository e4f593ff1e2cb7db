use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

/// 遍历时交给访问者的路径
#[derive(Debug, Clone)]
pub struct WalkedPath {
    /// 绝对路径（位于扫描根目录之下）
    pub path: PathBuf,

    /// 是否是目录（不跟随符号链接）
    pub is_dir: bool,
}

/// 访问者对当前路径的处理决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// 继续遍历
    Continue,
    /// 不进入当前目录（对文件等同于 Continue）
    SkipSubtree,
    /// 立即结束遍历
    Stop,
}

/// 文件遍历器 - 按字典序深度优先遍历扫描根目录
pub struct FileWalker {
    root: PathBuf,
    excluded_path: Option<PathBuf>,
}

impl FileWalker {
    /// 创建新的文件遍历器，`root` 应该是已经解析过的绝对路径
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded_path: None,
        }
    }

    /// 始终跳过的绝对路径（输出文件本身）
    pub fn exclude_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_path = Some(path.into());
        self
    }

    /// 扫描根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 遍历目录树，对每个路径调用访问者
    ///
    /// 遍历出错或访问者返回错误时立即中止并返回错误。
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&WalkedPath) -> Result<WalkAction>,
    {
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.with_context(|| format!("遍历目录时出错: {}", self.root.display()))?;

            if self.is_excluded(entry.path()) {
                debug!("跳过输出文件: {}", entry.path().display());
                continue;
            }

            let walked = WalkedPath {
                path: entry.path().to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            };

            match visit(&walked)? {
                WalkAction::Continue => {}
                WalkAction::SkipSubtree => {
                    if walked.is_dir {
                        debug!("跳过目录: {}", walked.path.display());
                        walker.skip_current_dir();
                    }
                }
                WalkAction::Stop => break,
            }
        }

        Ok(())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded_path
            .as_deref()
            .is_some_and(|excluded| excluded == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn create_tree(root: &Path) {
        fs::create_dir_all(root.join("b_dir/nested")).unwrap();
        fs::create_dir_all(root.join("skip_me")).unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b_dir/nested/deep.txt"), "deep").unwrap();
        fs::write(root.join("skip_me/hidden.txt"), "hidden").unwrap();
    }

    fn relative_paths(root: &Path, walker: &FileWalker) -> Vec<String> {
        let mut seen = Vec::new();
        walker
            .walk(|walked| {
                let relative = walked.path.strip_prefix(root).unwrap();
                seen.push(relative.to_string_lossy().replace('\\', "/"));
                if walked.is_dir && relative == Path::new("skip_me") {
                    return Ok(WalkAction::SkipSubtree);
                }
                Ok(WalkAction::Continue)
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_walk_is_lexical_and_depth_first() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        create_tree(&root);

        let walker = FileWalker::new(&root);
        let seen = relative_paths(&root, &walker);

        assert_eq!(
            seen,
            vec![
                "a.txt",
                "b_dir",
                "b_dir/nested",
                "b_dir/nested/deep.txt",
                "c.txt",
                "skip_me",
            ]
        );
    }

    #[test]
    fn test_excluded_path_is_never_visited() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        create_tree(&root);

        let walker = FileWalker::new(&root).exclude_path(root.join("c.txt"));
        let seen = relative_paths(&root, &walker);

        assert!(!seen.contains(&"c.txt".to_string()));
        assert!(seen.contains(&"a.txt".to_string()));
    }

    #[test]
    fn test_stop_ends_walk() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        create_tree(&root);

        let mut visited = 0;
        FileWalker::new(&root)
            .walk(|_| {
                visited += 1;
                Ok(WalkAction::Stop)
            })
            .unwrap();

        assert_eq!(visited, 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let walker = FileWalker::new(temp_dir.path().join("does-not-exist"));

        assert!(walker.walk(|_| Ok(WalkAction::Continue)).is_err());
    }

    #[test]
    fn test_visitor_error_aborts_walk() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        create_tree(&root);

        let result = FileWalker::new(&root).walk(|_| Err(anyhow::anyhow!("boom")));

        assert!(result.is_err());
    }
}
