//! End-to-end cycle tests against a mocked subprocess layer.
//!
//! Every git invocation is intercepted by `MockProcessRunner`; file reads
//! hit a real temporary directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use gitpulse::config::{CommitStrategy, PulseConfig};
use gitpulse::orchestrator::{CommitOrchestrator, CycleError};
use gitpulse::subprocess::{
    MockProcessRunner, ProcessCommand, ProcessRunner, SubprocessManager,
};

fn orchestrator(
    mock: &MockProcessRunner,
    root: &Path,
    strategy: CommitStrategy,
) -> CommitOrchestrator {
    let manager = SubprocessManager::new(Arc::new(mock.clone()) as Arc<dyn ProcessRunner>);
    let config = PulseConfig::new(root.to_path_buf(), strategy);
    let git = Arc::new(manager.git(root));
    CommitOrchestrator::new(git, config)
}

fn git_calls(history: &[ProcessCommand]) -> Vec<Vec<String>> {
    history
        .iter()
        .filter(|cmd| cmd.program == "git")
        .map(|cmd| cmd.args.clone())
        .collect()
}

fn commit_messages(history: &[ProcessCommand]) -> Vec<String> {
    git_calls(history)
        .into_iter()
        .filter(|args| args.first().map(String::as_str) == Some("commit"))
        .map(|args| args[2].clone())
        .collect()
}

fn expect_file_query(mock: &mut MockProcessRunner, stdout: &str) {
    mock.expect_command("sh")
        .with_args(|args| args == &["-c", "git ls-files -m"])
        .returns_stdout(stdout)
        .returns_success()
        .finish();
}

fn expect_git_mutations(mock: &mut MockProcessRunner) {
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("add"))
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("commit"))
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("push"))
        .returns_success()
        .finish();
}

#[tokio::test]
async fn per_file_cycle_commits_each_file_individually() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "// COMMIT: add a\nbody\n").unwrap();
    fs::write(dir.path().join("b.txt"), "no marker here\n").unwrap();

    let mut mock = MockProcessRunner::new();
    expect_file_query(&mut mock, "a.txt\nb.txt\n");
    expect_git_mutations(&mut mock);

    let report = orchestrator(&mock, dir.path(), CommitStrategy::PerFile)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.commits, 2);
    assert!(report.pushed);

    let history = mock.get_call_history();
    let messages = commit_messages(&history);
    assert_eq!(messages.len(), 2);
    assert!(messages[0].ends_with("add a"), "got: {}", messages[0]);
    assert!(messages[1].ends_with("no comment"), "got: {}", messages[1]);

    // Each file staged on its own, in order, then exactly one push.
    let calls = git_calls(&history);
    assert_eq!(calls[0], vec!["add", "a.txt"]);
    assert_eq!(calls[1][0], "commit");
    assert_eq!(calls[2], vec!["add", "b.txt"]);
    assert_eq!(calls[3][0], "commit");
    assert_eq!(calls[4], vec!["push", "origin", "main"]);
    assert_eq!(calls.len(), 5);
}

#[tokio::test]
async fn per_file_cycle_with_no_changes_does_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let mut mock = MockProcessRunner::new();
    expect_file_query(&mut mock, "");

    let report = orchestrator(&mock, dir.path(), CommitStrategy::PerFile)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.commits, 0);
    assert!(!report.pushed);
    // The status query is the only subprocess call.
    assert_eq!(mock.get_call_history().len(), 1);
}

#[tokio::test]
async fn second_cycle_without_new_changes_commits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "// COMMIT: add a\n").unwrap();

    let mut mock = MockProcessRunner::new();
    mock.expect_command("sh")
        .with_args(|args| args == &["-c", "git ls-files -m"])
        .returns_stdout("a.txt\n")
        .times(1)
        .finish();
    expect_file_query(&mut mock, "");
    expect_git_mutations(&mut mock);

    let orchestrator = orchestrator(&mock, dir.path(), CommitStrategy::PerFile);
    let first = orchestrator.run_cycle().await.unwrap();
    let second = orchestrator.run_cycle().await.unwrap();

    assert_eq!(first.commits, 1);
    assert_eq!(second.commits, 0);
    assert_eq!(commit_messages(&mock.get_call_history()).len(), 1);
}

#[tokio::test]
async fn per_file_skips_excluded_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "// COMMIT: add a\n").unwrap();

    let mut mock = MockProcessRunner::new();
    expect_file_query(&mut mock, "update.sh\na.txt\nupdate.js\n");
    expect_git_mutations(&mut mock);

    let report = orchestrator(&mock, dir.path(), CommitStrategy::PerFile)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.commits, 1);
    let calls = git_calls(&mock.get_call_history());
    assert_eq!(calls[0], vec!["add", "a.txt"]);
}

#[tokio::test]
async fn commit_failure_aborts_the_cycle_before_push() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "// COMMIT: add a\n").unwrap();

    let mut mock = MockProcessRunner::new();
    expect_file_query(&mut mock, "a.txt\n");
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("add"))
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("commit"))
        .returns_stderr("nothing to commit\n")
        .returns_exit_code(1)
        .finish();

    let result = orchestrator(&mock, dir.path(), CommitStrategy::PerFile)
        .run_cycle()
        .await;

    assert!(matches!(result, Err(CycleError::Git(_))));
    let calls = git_calls(&mock.get_call_history());
    assert!(calls.iter().all(|args| args[0] != "push"));
}

#[tokio::test]
async fn bulk_cycle_stages_everything_and_commits_once() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "no marker\n").unwrap();
    fs::write(dir.path().join("b.txt"), "// COMMIT: add b\n").unwrap();

    let mut mock = MockProcessRunner::new();
    mock.expect_command("git")
        .with_args(|args| args == &["add", "."])
        .returns_success()
        .finish();
    mock.expect_command("sh")
        .with_args(|args| args == &["-c", "git status --porcelain"])
        .returns_stdout(" M a.txt\n\n M update.sh\n M b.txt\n")
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("commit"))
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args == &["push"])
        .returns_success()
        .finish();

    let report = orchestrator(&mock, dir.path(), CommitStrategy::Bulk)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.commits, 1);
    assert!(report.pushed);
    assert!(report.skipped.is_empty());

    // The last eligible file's message covers the whole staged set.
    let messages = commit_messages(&mock.get_call_history());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("add b"), "got: {}", messages[0]);
}

#[tokio::test]
async fn bulk_cycle_skips_locked_files_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "// COMMIT: add b\n").unwrap();
    // missing.txt is listed by status but absent on disk.

    let mut mock = MockProcessRunner::new();
    mock.expect_command("git")
        .with_args(|args| args == &["add", "."])
        .returns_success()
        .finish();
    mock.expect_command("sh")
        .with_args(|args| args == &["-c", "git status --porcelain"])
        .returns_stdout(" D missing.txt\n M b.txt\n")
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args.first().map(String::as_str) == Some("commit"))
        .returns_success()
        .finish();
    mock.expect_command("git")
        .with_args(|args| args == &["push"])
        .returns_success()
        .finish();

    let report = orchestrator(&mock, dir.path(), CommitStrategy::Bulk)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.commits, 1);
    assert_eq!(report.skipped, vec!["missing.txt"]);
}

#[tokio::test]
async fn bulk_cycle_with_clean_tree_skips_commit_and_push() {
    let dir = tempfile::tempdir().unwrap();

    let mut mock = MockProcessRunner::new();
    mock.expect_command("git")
        .with_args(|args| args == &["add", "."])
        .returns_success()
        .finish();
    mock.expect_command("sh")
        .with_args(|args| args == &["-c", "git status --porcelain"])
        .returns_stdout("")
        .returns_success()
        .finish();

    let report = orchestrator(&mock, dir.path(), CommitStrategy::Bulk)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.commits, 0);
    assert!(!report.pushed);
    assert_eq!(mock.get_call_history().len(), 2);
}
