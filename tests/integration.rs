//! Integration tests for treescan


use std::fs;

use harness::{TestTree, entry_lines, run_treescan};

fn scenario() -> TestTree {
    let tree = TestTree::new();
    tree.add_file("f1.txt", "12345");
    tree.add_file("f2.txt", "1234567890");
    tree.add_dir("sub");
    tree
}

#[test]
fn test_listing_with_files() {
    let tree = scenario();

    let (stdout, stderr, code) = run_treescan(tree.path(), &[".", "-f"]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert_eq!(
        entry_lines(&stdout),
        vec![
            format!("{:>20}    f1.txt", 5),
            format!("{:>20}    f2.txt", 10),
            format!("{:>20}    <sub>", "-"),
        ]
    );
    assert!(
        stdout.contains("root:       2 files (15B), 0 symlinks, 0 special entries, 1 subdirectories, 3 total"),
        "summary missing: {}",
        stdout
    );
}

#[test]
fn test_default_listing_rolls_up_files() {
    let tree = scenario();

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[]);
    assert_eq!(code, 0);
    let lines = entry_lines(&stdout);
    assert_eq!(lines[0], format!("{:>20}    <sub>", "-"));
    assert_eq!(lines[1], format!("{:>20}    <2 files>", 15));
    assert!(!stdout.contains("f1.txt"));
}

#[test]
fn test_recursive_depth_limit() {
    let tree = TestTree::new();
    tree.add_file("a/b/c/deep.txt", "deep");
    tree.add_file("a/top.txt", "top");

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-f", "-r", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("<a>"));
    assert!(stdout.contains(&format!("{:>20}        <b>", "-")));
    assert!(stdout.contains("top.txt"));
    assert!(!stdout.contains("<c>"), "c is below the depth limit: {}", stdout);
    assert!(!stdout.contains("deep.txt"));
    assert!(stdout.contains("cumulative: 1 files (3B), 0 symlinks, 0 special entries, 2 subdirectories, 3 total"));
}

#[test]
fn test_recursive_unlimited() {
    let tree = TestTree::new();
    tree.add_file("a/b/c/deep.txt", "deep");

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-f", "-r"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(&format!("{:>20}                {}", 4, "deep.txt")));
}

#[test]
fn test_contains_search() {
    let tree = scenario();
    let root = fs::canonicalize(tree.path()).unwrap();

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-f", "--contains", "f1"]);
    assert_eq!(code, 0);

    let lines = entry_lines(&stdout);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(&root.join("f1.txt").display().to_string()));
    assert!(stdout.contains("matched:    1 files (5B)"));
    assert!(stdout.contains("traversed:  2 files (15B), 0 symlinks, 0 special entries, 1 subdirectories, 3 total"));
}

#[test]
fn test_search_noext_recursive() {
    let tree = TestTree::new();
    tree.add_file("src/lib.rs", "");
    tree.add_file("docs/lib.md", "");
    tree.add_file("docs/library.md", "");

    let (stdout, _stderr, code) =
        run_treescan(tree.path(), &[".", "-r", "-f", "-R", "--search-noext", "lib"]);
    assert_eq!(code, 0);

    let lines = entry_lines(&stdout);
    assert_eq!(lines.len(), 2, "{}", stdout);
    assert!(lines[0].ends_with("docs/lib.md"));
    assert!(lines[1].ends_with("src/lib.rs"));
}

#[test]
fn test_exact_search_matches_directories_without_flags() {
    let tree = TestTree::new();
    tree.add_dir("target");
    tree.add_file("nested/target", "file named target");

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-r", "-R", "-S", "target"]);
    assert_eq!(code, 0);

    // the file is counted as traversed but not shown without -f
    let lines = entry_lines(&stdout);
    assert_eq!(lines, vec![format!("{:>20}    <target>", "-")]);
    assert!(stdout.contains("matched:    0 files"));
}

#[test]
fn test_hidden_entries() {
    let tree = TestTree::new();
    tree.add_file(".env", "SECRET=1");
    tree.add_file("visible.txt", "v");

    let (stdout, _stderr, _) = run_treescan(tree.path(), &[".", "-f"]);
    assert!(!stdout.contains(".env"));
    assert!(stdout.contains("1 total"));

    let (stdout, _stderr, _) = run_treescan(tree.path(), &[".", "-f", "-H"]);
    assert!(stdout.contains(".env"));
    assert!(stdout.contains("2 total"));
}

#[test]
fn test_dir_size_column() {
    let tree = TestTree::new();
    tree.add_file("sub/a.bin", "1234");
    tree.add_file("sub/deeper/b.bin", "123456");

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-d"]);
    assert_eq!(code, 0);
    assert_eq!(entry_lines(&stdout)[0], format!("{:>20}    <sub>", 10));
}

#[test]
fn test_permissions_and_mtime_columns() {
    let tree = TestTree::new();
    tree.add_file("a.txt", "a");

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-f", "-p", "-t"]);
    assert_eq!(code, 0);
    let line = entry_lines(&stdout)[0];
    assert!(line.ends_with("    a.txt"));
    // yyyy-mm-dd hh:mm:ss
    let time = &line[33..52];
    assert_eq!(time.as_bytes()[4], b'-');
    assert_eq!(time.as_bytes()[13], b':');
}

#[test]
fn test_json_output() {
    let tree = scenario();

    let (stdout, _stderr, code) = run_treescan(tree.path(), &[".", "-f", "--json"]);
    assert_eq!(code, 0);

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["name"], "f1.txt");
    assert_eq!(entries[0]["type"], "file");
    assert_eq!(entries[2]["type"], "directory");
    assert_eq!(json["summary"]["root"]["files"], 2);
    assert_eq!(json["summary"]["root"]["bytes"], 15);
    assert_eq!(json["summary"]["complete"], true);
}

#[test]
fn test_json_search_summary() {
    let tree = scenario();

    let (stdout, _stderr, code) =
        run_treescan(tree.path(), &[".", "-f", "--json", "--contains", "f1"]);
    assert_eq!(code, 0);

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["summary"]["matched"]["total"], 1);
    assert_eq!(json["summary"]["traversed"]["total"], 3);
    assert!(json["summary"].get("cumulative").is_none());
}

#[test]
fn test_default_path_is_current_directory() {
    let tree = scenario();
    let (with_dot, _, _) = run_treescan(tree.path(), &["."]);
    let (without, _, _) = run_treescan(tree.path(), &[]);
    assert_eq!(with_dot, without);
}
