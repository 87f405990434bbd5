//! CLI output and exit-code contracts, driven against an in-memory tree.

use boxwalk::config::BoxwalkConfig;
use boxwalk::remote::{MemoryTree, PageFetcher};
use boxwalk::tooling::cli::{Cli, CliContext, CommandOutput, EXIT_INTERRUPTED};
use clap::Parser;
use std::sync::Arc;
use tempfile::TempDir;

fn tree() -> Arc<MemoryTree> {
    let tree = MemoryTree::new(3);
    tree.add_folder("/alpha/pending");
    tree.add_folder("/alpha/photos/new");
    tree.add_tagged_file("/alpha/photos/cat.jpg", &["pets"]);
    tree.add_file("/alpha/photos/new/bird.jpg");
    tree.add_folder("/beta");
    tree.add_file("/readme.txt");
    Arc::new(tree)
}

fn context(tree: &Arc<MemoryTree>, dir: &TempDir) -> CliContext {
    let mut config = BoxwalkConfig::default();
    config.crawl.delay_ms = 0;
    config.crawl.checkpoint = dir.path().join("ckpt.json");
    let fetcher: Arc<dyn PageFetcher> = tree.clone();
    CliContext::with_fetcher(config, fetcher, "test-account")
}

fn run(ctx: &CliContext, args: &[&str]) -> CommandOutput {
    let mut argv = vec!["boxwalk"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    ctx.execute(&cli.command).unwrap()
}

#[test]
fn list_folders_json_contract_has_required_fields() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&tree(), &dir);

    let output = run(&ctx, &["list-folders", "/alpha/", "--format", "json"]);
    assert_eq!(output.exit_code(), 0);
    assert!(output.notice.is_none());

    let parsed: serde_json::Value = serde_json::from_str(&output.body).unwrap();
    assert_eq!(parsed["status"], "complete");
    assert_eq!(parsed["count"], 2);
    let paths: Vec<&str> = parsed["folders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/alpha/pending", "/alpha/photos"]);
}

#[test]
fn list_files_text_renders_folder_and_tags_columns() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&tree(), &dir);

    let output = run(&ctx, &["list-files", "/alpha/**", "--tags"]);
    assert_eq!(output.exit_code(), 0);
    for expected in ["ID", "Folder", "Filename", "Tags", "/alpha/photos", "cat.jpg", "pets", "bird.jpg"] {
        assert!(output.body.contains(expected), "missing {expected:?} in\n{}", output.body);
    }
    assert!(!output.body.contains("readme.txt"));
}

#[test]
fn nothing_matched_is_a_warning_not_a_failure() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&tree(), &dir);

    let output = run(&ctx, &["list-files", "/gamma/**"]);
    assert_eq!(output.exit_code(), 0);
    assert!(output.body.is_empty());
    assert!(output.notice.unwrap().contains("No files matched"));
}

#[test]
fn batch_cap_exits_interrupted_then_resumes() {
    let dir = TempDir::new().unwrap();
    let tree = tree();
    let ctx = context(&tree, &dir);

    let first = run(&ctx, &["list-folders", "/", "--batch-size", "2", "--format", "json"]);
    assert_eq!(first.exit_code(), EXIT_INTERRUPTED);
    let parsed: serde_json::Value = serde_json::from_str(&first.body).unwrap();
    assert_eq!(parsed["status"], "interrupted");
    assert_eq!(parsed["reason"], "batch limit");
    assert!(dir.path().join("ckpt.json").exists());

    let second = run(&ctx, &["list-folders", "/", "--format", "json"]);
    assert_eq!(second.exit_code(), 0);
    let parsed: serde_json::Value = serde_json::from_str(&second.body).unwrap();
    let paths: Vec<&str> = parsed["folders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/alpha", "/beta"]);
    assert!(!dir.path().join("ckpt.json").exists());

    // root, alpha, beta, pending, photos, new: each expanded once across both runs
    assert_eq!(tree.expansions().len(), 6);
}

#[test]
fn different_glob_does_not_resume_checkpoint() {
    let dir = TempDir::new().unwrap();
    let tree = tree();
    let ctx = context(&tree, &dir);

    let first = run(&ctx, &["list-files", "/alpha/**", "--batch-size", "1"]);
    assert_eq!(first.exit_code(), EXIT_INTERRUPTED);
    assert!(first.body.is_empty());
    assert!(first.notice.unwrap().contains("interrupted"));

    let other = run(&ctx, &["list-files", "/beta/**"]);
    assert_eq!(other.exit_code(), 0);
    assert!(other.body.is_empty());
    assert!(other.notice.unwrap().contains("No files matched"));

    let expansions = tree.expansions();
    assert_eq!(expansions[0], expansions[1]);
}

#[test]
fn corrupt_checkpoint_is_an_error_without_no_resume() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ckpt.json"), "garbage").unwrap();
    let ctx = context(&tree(), &dir);

    let cli = Cli::try_parse_from(["boxwalk", "list-folders"]).unwrap();
    let err = ctx.execute(&cli.command).unwrap_err();
    assert!(err.is_parse_error());

    let output = run(&ctx, &["list-folders", "--no-resume"]);
    assert_eq!(output.exit_code(), 0);
}
