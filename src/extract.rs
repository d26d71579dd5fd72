//! Extractor stage: commit history in, `monthly_activity.csv` out.

use crate::config::Paths;
use crate::error::Result;
use crate::git::{CommitSource, GitRepo};
use crate::model::{CommitRecord, MonthlyActivity, RawCommit};
use crate::output::write_atomic;
use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub output: PathBuf,
    pub months: usize,
    pub commits: u64,
    pub merges_skipped: u64,
}

pub fn exec(paths: &Paths) -> anyhow::Result<()> {
    let repo = GitRepo::open(&paths.repo).context("Failed to open git repository")?;
    println!("Analyzing repository: {}", style(repo.path().display()).cyan());

    let summary = run(repo, &paths.monthly_csv()).context("Failed to extract monthly activity")?;
    println!(
        "Monthly activity data saved to: {}",
        style(summary.output.display()).green()
    );
    Ok(())
}

/// Consumes `source` once and replaces `output` with the aggregated table.
pub fn run<S: CommitSource>(source: S, output: &Path) -> Result<ExtractSummary> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {pos}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Walking commits...");

    let mut merges_skipped = 0u64;
    let records = collect_records(
        source.into_commits().inspect(|item| {
            pb.inc(1);
            if matches!(item, Ok(raw) if raw.is_merge()) {
                merges_skipped += 1;
            }
        }),
    );
    pb.finish_and_clear();
    let records = records?;

    let monthly = aggregate_monthly(&records);
    debug!(
        commits = records.len(),
        merges_skipped,
        months = monthly.len(),
        "aggregated commit history"
    );
    write_monthly_csv(&monthly, output)?;

    Ok(ExtractSummary {
        output: output.to_path_buf(),
        months: monthly.len(),
        commits: records.len() as u64,
        merges_skipped,
    })
}

/// Drops merge commits and projects the rest into records. Stops at the first error.
pub fn collect_records<I>(commits: I) -> Result<Vec<CommitRecord>>
where
    I: IntoIterator<Item = Result<RawCommit>>,
{
    let mut records = Vec::new();
    for raw in commits {
        let raw = raw?;
        if raw.is_merge() {
            continue;
        }
        records.push(CommitRecord::from_raw(raw)?);
    }
    Ok(records)
}

/// One row per distinct month, ascending by month.
pub fn aggregate_monthly(records: &[CommitRecord]) -> Vec<MonthlyActivity> {
    let mut months: BTreeMap<&str, MonthlyActivity> = BTreeMap::new();
    for record in records {
        months
            .entry(record.month.as_str())
            .or_insert_with(|| MonthlyActivity::new(record.month.clone()))
            .add_record(record);
    }
    months.into_values().collect()
}

pub fn write_monthly_csv(rows: &[MonthlyActivity], path: &Path) -> Result<()> {
    write_atomic(path, |file| {
        // Header written by hand so an empty history still yields a valid table.
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(crate::model::MONTHLY_COLUMNS)
            .map_err(into_io)?;
        for row in rows {
            writer.serialize(row).map_err(into_io)?;
        }
        writer.flush()
    })
}

fn into_io(err: csv::Error) -> std::io::Error {
    std::io::Error::other(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;

    fn commit(id: &str, parents: usize, ymd: (i32, u32, u32), ins: u64, del: u64) -> RawCommit {
        let tz = FixedOffset::east_opt(0).unwrap();
        RawCommit {
            id: id.into(),
            parent_count: parents,
            committed_at: Some(tz.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 12, 0, 0).unwrap()),
            insertions: Some(ins),
            deletions: Some(del),
        }
    }

    fn history() -> Vec<RawCommit> {
        vec![
            commit("a1", 0, (2020, 1, 3), 10, 0),
            commit("a2", 1, (2020, 1, 9), 20, 5),
            commit("a3", 1, (2020, 1, 21), 5, 0),
            commit("m1", 2, (2020, 1, 22), 100, 0),
            commit("b1", 1, (2019, 12, 30), 7, 3),
        ]
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn merges_contribute_nothing() {
        let records = collect_records(history().into_commits()).unwrap();
        let rows = aggregate_monthly(&records);
        assert_eq!(
            rows,
            vec![
                MonthlyActivity {
                    month: "2019-12".into(),
                    commits: 1,
                    additions: 7,
                    deletions: 3,
                    churn: 10,
                },
                MonthlyActivity {
                    month: "2020-01".into(),
                    commits: 3,
                    additions: 35,
                    deletions: 5,
                    churn: 40,
                },
            ]
        );
    }

    #[test]
    fn traversal_order_does_not_change_output() {
        let dir = tempfile::tempdir().unwrap();
        let forward = dir.path().join("forward.csv");
        let backward = dir.path().join("backward.csv");

        run(history(), &forward).unwrap();
        let mut reversed = history();
        reversed.reverse();
        run(reversed, &backward).unwrap();

        assert_eq!(read(&forward), read(&backward));
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/clean/monthly_activity.csv");

        let summary = run(history(), &out).unwrap();
        assert_eq!(summary.months, 2);
        assert_eq!(summary.commits, 4);
        assert_eq!(summary.merges_skipped, 1);
        assert_eq!(
            read(&out),
            "month,commits,additions,deletions,churn\n\
             2019-12,1,7,3,10\n\
             2020-01,3,35,5,40\n"
        );
    }

    #[test]
    fn overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("monthly_activity.csv");
        std::fs::write(&out, "stale,data\n1,2\n3,4\n5,6\n").unwrap();

        run(vec![commit("x", 1, (2021, 6, 1), 100, 50)], &out).unwrap();
        assert_eq!(
            read(&out),
            "month,commits,additions,deletions,churn\n2021-06,1,100,50,150\n"
        );
    }

    #[test]
    fn empty_history_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("monthly_activity.csv");
        let summary = run(Vec::<RawCommit>::new(), &out).unwrap();
        assert_eq!(summary.months, 0);
        assert_eq!(read(&out), "month,commits,additions,deletions,churn\n");
    }

    #[test]
    fn missing_timestamp_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("monthly_activity.csv");
        let mut commits = history();
        commits[2].committed_at = None;

        let err = run(commits, &out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
        assert!(!out.exists());
    }

    #[test]
    fn merge_without_timestamp_is_ignored() {
        let mut merge = commit("m", 3, (2020, 1, 1), 1, 1);
        merge.committed_at = None;
        let records = collect_records(vec![merge].into_commits()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn commit_counts_match_non_merge_commits() {
        let commits: Vec<RawCommit> = (0..40u32)
            .map(|i| {
                let parents = if i % 7 == 0 { 2 } else { 1 };
                let date = (2018 + (i % 3) as i32, 1 + i % 12, 1 + i % 28);
                commit(&format!("c{i}"), parents, date, i as u64, (i / 2) as u64)
            })
            .collect();
        let expected = commits.iter().filter(|c| !c.is_merge()).count() as u64;

        let rows = aggregate_monthly(&collect_records(commits.into_commits()).unwrap());
        assert_eq!(rows.iter().map(|r| r.commits).sum::<u64>(), expected);
        for pair in rows.windows(2) {
            assert!(pair[0].month < pair[1].month);
        }
        for row in &rows {
            assert!(row.commits >= 1);
            assert_eq!(row.churn, row.additions + row.deletions);
        }
    }
}
