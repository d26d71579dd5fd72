use assert_cmd::prelude::*;
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str], date: Option<&str>) {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir);
    if let Some(date) = date {
        cmd.env("GIT_AUTHOR_DATE", date).env("GIT_COMMITTER_DATE", date);
    }
    assert!(cmd.status().unwrap().success(), "git {args:?} failed");
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"], None);
    git(dir, &["config", "core.autocrlf", "false"], None);
    git(dir, &["config", "core.safecrlf", "false"], None);
    git(dir, &["config", "user.email", "you@example.com"], None);
    git(dir, &["config", "user.name", "Your Name"], None);
}

fn lines(range: std::ops::RangeInclusive<u32>) -> String {
    range.map(|i| format!("line {i}\n")).collect()
}

fn commit_file(dir: &Path, name: &str, content: &str, date: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    git(dir, &["add", "."], None);
    git(dir, &["commit", "-m", &format!("update {name}")], Some(date));
}

/// Three January commits (+10/-0, +20/-5, +5/-0) plus a merged branch whose only
/// commit is dated December and adds 100 lines.
fn build_history(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "a.txt", &lines(1..=10), "2020-01-05T12:00:00+00:00");

    git(dir, &["checkout", "-b", "feat"], None);
    commit_file(dir, "big.txt", &lines(1..=100), "2019-12-15T12:00:00+00:00");
    git(dir, &["checkout", "-"], None);

    let rewritten = format!("{}{}", lines(6..=10), lines(11..=30));
    commit_file(dir, "a.txt", &rewritten, "2020-01-10T12:00:00+00:00");
    commit_file(dir, "c.txt", &lines(1..=5), "2020-01-15T12:00:00+00:00");
    git(
        dir,
        &["merge", "--no-ff", "feat", "-m", "merge feat"],
        Some("2020-01-20T12:00:00+00:00"),
    );
}

#[test]
fn extract_writes_monthly_csv_without_merges() {
    if !has_git() {
        return;
    }
    let repo = tempdir().unwrap();
    let out = tempdir().unwrap();
    build_history(repo.path());

    let mut cmd = Command::cargo_bin("gcadence").unwrap();
    cmd.arg("extract")
        .arg("--repo")
        .arg(repo.path())
        .arg("--data-dir")
        .arg(out.path().join("data/clean"));
    let stdout = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&stdout);
    assert!(stdout.contains("Analyzing repository:"));
    assert!(stdout.contains("monthly_activity.csv"));

    let csv = fs::read_to_string(out.path().join("data/clean/monthly_activity.csv")).unwrap();
    assert_eq!(
        csv,
        "month,commits,additions,deletions,churn\n\
         2019-12,1,100,0,100\n\
         2020-01,3,35,5,40\n"
    );
}

#[test]
fn extract_is_repeatable() {
    if !has_git() {
        return;
    }
    let repo = tempdir().unwrap();
    let out = tempdir().unwrap();
    build_history(repo.path());

    let run = || {
        Command::cargo_bin("gcadence")
            .unwrap()
            .arg("extract")
            .arg("--repo")
            .arg(repo.path())
            .arg("--data-dir")
            .arg(out.path())
            .assert()
            .success();
        fs::read_to_string(out.path().join("monthly_activity.csv")).unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn extract_fails_for_missing_repository() {
    let out = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("gcadence").unwrap();
    cmd.arg("extract")
        .arg("--repo")
        .arg(out.path().join("no-such-repo"))
        .arg("--data-dir")
        .arg(out.path().join("data"));
    let stderr = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&stderr).contains("Failed to open git repository"));
    assert!(!out.path().join("data/monthly_activity.csv").exists());
}

#[test]
fn plot_renders_four_images() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data/clean");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("monthly_activity.csv"),
        "month,commits,additions,deletions,churn\n2021-06,4,100,50,150\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("gcadence").unwrap();
    cmd.arg("plot")
        .arg("--data-dir")
        .arg(&data)
        .arg("--plots-dir")
        .arg(dir.path().join("plots"));
    let stdout = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&stdout);
    assert!(stdout.contains("=== Dataset Summary ==="));
    assert!(stdout.contains("All plots generated."));

    for name in [
        "commits_time_series.png",
        "churn_distribution.png",
        "commit_heatmap.png",
        "commits_vs_churn_scatter.png",
    ] {
        assert!(dir.path().join("plots").join(name).is_file(), "{name} missing");
        assert!(stdout.contains(name));
    }
}

#[test]
fn plot_rejects_non_date_month() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("monthly_activity.csv"),
        "month,commits,additions,deletions,churn\nnot-a-date,4,100,50,150\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("gcadence").unwrap();
    cmd.arg("plot")
        .arg("--data-dir")
        .arg(dir.path())
        .arg("--plots-dir")
        .arg(dir.path().join("plots"));
    let stderr = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&stderr).contains("not-a-date"));
    assert!(!dir.path().join("plots").exists());
}

#[test]
fn plot_requires_extracted_csv() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("gcadence").unwrap();
    cmd.current_dir(dir.path()).arg("plot");
    cmd.assert().failure();
}

#[test]
fn extract_counts_renamed_file_as_delete_and_add() {
    if !has_git() {
        return;
    }
    let repo = tempdir().unwrap();
    let out = tempdir().unwrap();
    init_git_repo(repo.path());
    commit_file(repo.path(), "a.txt", &lines(1..=100), "2020-01-05T12:00:00+00:00");
    git(repo.path(), &["mv", "a.txt", "b.txt"], None);
    git(
        repo.path(),
        &["commit", "-m", "rename a.txt"],
        Some("2020-02-05T12:00:00+00:00"),
    );

    Command::cargo_bin("gcadence")
        .unwrap()
        .arg("extract")
        .arg("--repo")
        .arg(repo.path())
        .arg("--data-dir")
        .arg(out.path())
        .assert()
        .success();

    let csv = fs::read_to_string(out.path().join("monthly_activity.csv")).unwrap();
    assert_eq!(
        csv,
        "month,commits,additions,deletions,churn\n\
         2020-01,1,100,0,100\n\
         2020-02,1,100,100,200\n"
    );
}
