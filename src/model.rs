use crate::error::{PulseError, Result};
use crate::util::month_key;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Column order of the persisted monthly table.
pub const MONTHLY_COLUMNS: [&str; 5] = ["month", "commits", "additions", "deletions", "churn"];

/// One commit as reported by the history walker, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCommit {
    pub id: String,
    pub parent_count: usize,
    pub committed_at: Option<DateTime<FixedOffset>>,
    pub insertions: Option<u64>,
    pub deletions: Option<u64>,
}

impl RawCommit {
    pub fn is_merge(&self) -> bool {
        self.parent_count > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub month: String,
    pub hash: String,
    pub additions: u64,
    pub deletions: u64,
    pub churn: u64,
}

impl CommitRecord {
    /// Projects a non-merge commit into a record. Absent line counts become zero here
    /// and nowhere else.
    pub fn from_raw(raw: RawCommit) -> Result<Self> {
        let committed_at = raw.committed_at.ok_or_else(|| PulseError::DataIntegrity {
            commit: raw.id.clone(),
            field: "committer time",
        })?;
        let additions = raw.insertions.unwrap_or(0);
        let deletions = raw.deletions.unwrap_or(0);

        Ok(Self {
            month: month_key(&committed_at),
            hash: raw.id,
            additions,
            deletions,
            churn: additions + deletions,
        })
    }
}

/// A persisted row of `monthly_activity.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyActivity {
    pub month: String,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub churn: u64,
}

impl MonthlyActivity {
    pub fn new(month: String) -> Self {
        Self {
            month,
            commits: 0,
            additions: 0,
            deletions: 0,
            churn: 0,
        }
    }

    pub fn add_record(&mut self, record: &CommitRecord) {
        self.commits += 1;
        self.additions += record.additions;
        self.deletions += record.deletions;
        self.churn += record.churn;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::TimeZone;

    fn raw(offset_hours: i32, ins: Option<u64>, del: Option<u64>) -> RawCommit {
        let tz = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        RawCommit {
            id: "c0ffee".into(),
            parent_count: 1,
            committed_at: Some(tz.with_ymd_and_hms(2020, 1, 31, 23, 30, 0).unwrap()),
            insertions: ins,
            deletions: del,
        }
    }

    #[test]
    fn missing_counts_become_zero() {
        let record = CommitRecord::from_raw(raw(0, None, Some(4))).unwrap();
        assert_eq!(record.additions, 0);
        assert_eq!(record.deletions, 4);
        assert_eq!(record.churn, 4);
        assert_eq!(record.hash, "c0ffee");
    }

    #[test]
    fn month_uses_committer_offset() {
        // 2020-01-31 23:30 at -05:00 is already February in UTC.
        let record = CommitRecord::from_raw(raw(-5, Some(1), Some(1))).unwrap();
        assert_eq!(record.month, "2020-01");
    }

    #[test]
    fn missing_committer_time_is_an_integrity_error() {
        let mut commit = raw(0, Some(1), None);
        commit.committed_at = None;
        let err = CommitRecord::from_raw(commit).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataIntegrity);
    }

    #[test]
    fn root_commits_are_not_merges() {
        let mut commit = raw(0, None, None);
        commit.parent_count = 0;
        assert!(!commit.is_merge());
        commit.parent_count = 2;
        assert!(commit.is_merge());
    }
}
