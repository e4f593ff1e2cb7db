use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use single_gen::{CombineMode, CombineOptions, Combiner};

/// 输出文件中的所有条目：(路径, 大小, 内容)
fn parse_entries(output: &str) -> Vec<(String, u64, String)> {
    let mut entries = Vec::new();
    let blocks: Vec<&str> = output.split("\n### File: ").collect();

    for block in blocks.iter().skip(1) {
        let (path, rest) = block.split_once('\n').unwrap();
        let rest = rest.strip_prefix("### Size: ").unwrap();
        let (size, rest) = rest.split_once(" bytes\n").unwrap();
        let (_, content) = rest.split_once("\n\n").unwrap();
        let content = content.strip_suffix('\n').unwrap_or(content);
        entries.push((path.to_string(), size.parse().unwrap(), content.to_string()));
    }

    entries
}

fn entry_paths(output: &str) -> BTreeSet<String> {
    parse_entries(output).into_iter().map(|(path, _, _)| path).collect()
}

async fn combine(root: &Path, output: &Path, mode: CombineMode) -> String {
    let options = CombineOptions::new(root, output).mode(mode);
    Combiner::new(options).run().await.unwrap();
    fs::read_to_string(output).unwrap()
}

#[tokio::test]
async fn test_gitignore_scenario() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    fs::write(root.join("a.txt"), "0123456789").unwrap();
    fs::write(root.join(".gitignore"), "b.txt\n").unwrap();
    fs::write(root.join("b.txt"), "should not appear").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/c.txt"), "see").unwrap();
    let output = root.join("combined_output.txt");

    let text = combine(root, &output, CombineMode::Concurrent { workers: 4 }).await;

    let entries = parse_entries(&text);
    let paths: BTreeSet<_> = entries.iter().map(|(path, _, _)| path.clone()).collect();
    assert_eq!(
        paths,
        BTreeSet::from(["a.txt".to_string(), "sub/c.txt".to_string()])
    );

    let a = entries.iter().find(|(path, _, _)| path == "a.txt").unwrap();
    assert_eq!(a.1, 10);
    assert_eq!(a.2, "0123456789");

    assert!(!text.contains("should not appear"));
    assert!(!text.contains("### File: .gitignore"));
    assert!(!text.contains("### File: combined_output.txt"));
}

#[tokio::test]
async fn test_singlegen_ignore_scenario() {
    let temp_dir = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let root = temp_dir.path();

    fs::write(root.join(".singlegenignore"), "*.log\n").unwrap();
    fs::write(root.join(".gitignore"), "target/\n").unwrap();
    fs::write(root.join("debug.log"), "noise").unwrap();
    fs::write(root.join("main.rs"), "fn main() {}").unwrap();

    let text = combine(root, &out_dir.path().join("out.txt"), CombineMode::Sequential).await;

    assert_eq!(entry_paths(&text), BTreeSet::from(["main.rs".to_string()]));
}

#[tokio::test]
async fn test_ignored_directory_is_not_descended() {
    let temp_dir = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let root = temp_dir.path();

    fs::write(root.join(".gitignore"), "build/\n").unwrap();
    fs::create_dir_all(root.join("build/deep")).unwrap();
    fs::write(root.join("build/deep/keep_me_out.txt"), "x").unwrap();
    fs::create_dir_all(root.join(".git/objects")).unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
    fs::write(root.join("lib.rs"), "pub fn f() {}").unwrap();

    for mode in [CombineMode::Sequential, CombineMode::Concurrent { workers: 2 }] {
        let text = combine(root, &out_dir.path().join("out.txt"), mode).await;
        assert_eq!(entry_paths(&text), BTreeSet::from(["lib.rs".to_string()]));
    }
}

#[tokio::test]
async fn test_empty_tree_has_only_top_header() {
    let temp_dir = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let root = temp_dir.path();

    fs::write(root.join(".gitignore"), "*.tmp\n").unwrap();
    fs::write(root.join(".singlegenignore"), "*.log\n").unwrap();

    let output = out_dir.path().join("out.txt");
    let text = combine(root, &output, CombineMode::Concurrent { workers: 2 }).await;

    assert!(text.starts_with("# Combined File Contents\n# Generated: "));
    assert!(text.contains(&format!("# Source Directory: {}\n", root.display())));
    assert!(!text.contains("### File:"));
}

#[tokio::test]
async fn test_worker_count_does_not_change_entry_set() {
    let temp_dir = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let root = temp_dir.path();

    for dir in ["src", "src/nested", "docs"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    for i in 0..30 {
        let dir = ["src", "src/nested", "docs"][i % 3];
        let path = root.join(dir).join(format!("f{}.txt", i));
        fs::write(path, format!("file number {}", i)).unwrap();
    }

    let out = out_dir.path();
    let single = combine(root, &out.join("one.txt"), CombineMode::Concurrent { workers: 1 }).await;
    let many = combine(root, &out.join("many.txt"), CombineMode::Concurrent { workers: 8 }).await;
    let sequential = combine(root, &out.join("seq.txt"), CombineMode::Sequential).await;

    let mut single_entries = parse_entries(&single);
    let mut many_entries = parse_entries(&many);
    let mut sequential_entries = parse_entries(&sequential);
    single_entries.sort();
    many_entries.sort();
    sequential_entries.sort();

    assert_eq!(single_entries.len(), 30);
    assert_eq!(single_entries, many_entries);
    assert_eq!(single_entries, sequential_entries);
}

#[tokio::test]
async fn test_running_twice_is_idempotent() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("b.txt"), "b").unwrap();
    let output = root.join("combined_output.txt");

    let first = combine(root, &output, CombineMode::Concurrent { workers: 4 }).await;
    let second = combine(root, &output, CombineMode::Concurrent { workers: 4 }).await;

    assert_eq!(entry_paths(&first), entry_paths(&second));
    assert_eq!(entry_paths(&second).len(), 2);
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_is_reported_and_skipped() {
    let temp_dir = tempdir().unwrap();
    let out_dir = tempdir().unwrap();
    let root = temp_dir.path();

    fs::write(root.join("ok.txt"), "ok").unwrap();
    std::os::unix::fs::symlink("missing", root.join("dangling")).unwrap();

    for mode in [CombineMode::Sequential, CombineMode::Concurrent { workers: 2 }] {
        let output = out_dir.path().join("out.txt");
        let options = CombineOptions::new(root, &output).mode(mode);
        let summary = Combiner::new(options).run().await.unwrap();
        let text = fs::read_to_string(&output).unwrap();

        assert_eq!(entry_paths(&text), BTreeSet::from(["ok.txt".to_string()]));
        assert!(!text.contains("### File: dangling"));
        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.files_failed, 1);
    }
}
