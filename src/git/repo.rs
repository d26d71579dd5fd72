use super::lines::{count_lines, is_binary, line_changes};
use super::CommitSource;
use crate::error::{PulseError, Result};
use crate::model::RawCommit;
use chrono::{DateTime, FixedOffset};
use gix::object::tree::diff::ChangeDetached;
use gix::{ObjectId, Repository};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
    head: Option<ObjectId>,
}

impl GitRepo {
    /// Open the repository at exactly `path` (no upward discovery) and resolve HEAD.
    /// An unborn HEAD opens fine and walks as an empty history.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let requested = path.as_ref();
        let repo = gix::open(requested).map_err(|source| PulseError::Open {
            path: requested.to_path_buf(),
            source: Box::new(source),
        })?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        let path = std::fs::canonicalize(&path).unwrap_or(path);

        let mut head = repo.head()?;
        let head = if head.is_unborn() {
            None
        } else {
            Some(head.peel_to_commit_in_place()?.id)
        };

        Ok(Self { repo, path, head })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn walk(self) -> CommitWalk {
        CommitWalk {
            repo: self.repo,
            seen: HashSet::new(),
            stack: self.head.into_iter().collect(),
        }
    }
}

impl CommitSource for GitRepo {
    type Commits = CommitWalk;

    fn into_commits(self) -> CommitWalk {
        self.walk()
    }
}

/// Lazy depth-first traversal from HEAD, yielding one [`RawCommit`] per reachable commit.
pub struct CommitWalk {
    repo: Repository,
    seen: HashSet<ObjectId>,
    stack: Vec<ObjectId>,
}

impl Iterator for CommitWalk {
    type Item = Result<RawCommit>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(commit_id) = self.stack.pop() {
            if !self.seen.insert(commit_id) {
                continue;
            }
            let item = self.visit(commit_id);
            if item.is_err() {
                self.stack.clear();
            }
            return Some(item);
        }
        None
    }
}

impl CommitWalk {
    fn visit(&mut self, commit_id: ObjectId) -> Result<RawCommit> {
        let commit = self.repo.find_commit(commit_id)?;
        let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();
        let committed_at = commit.time().ok().and_then(|t| to_datetime(t.seconds, t.offset));

        // Merge commits never reach the aggregates, so their trees are not diffed.
        let (insertions, deletions) = match parents.as_slice() {
            [] => self.diff_stats(None, commit_id)?,
            [parent] => self.diff_stats(Some(*parent), commit_id)?,
            _ => (None, None),
        };

        for pid in parents.iter().rev() {
            if !self.seen.contains(pid) {
                self.stack.push(*pid);
            }
        }

        Ok(RawCommit {
            id: commit_id.to_string(),
            parent_count: parents.len(),
            committed_at,
            insertions,
            deletions,
        })
    }

    fn diff_stats(
        &self,
        parent_id: Option<ObjectId>,
        commit_id: ObjectId,
    ) -> Result<(Option<u64>, Option<u64>)> {
        let commit_tree = self.repo.find_commit(commit_id)?.tree()?;
        // Renames are a deletion plus an addition, as `git diff --numstat --no-renames` counts them.
        let opts = gix::diff::Options::default().with_rewrites(None);
        let changes: Vec<ChangeDetached> = match parent_id {
            Some(parent_id) => {
                let parent_tree = self.repo.find_commit(parent_id)?.tree()?;
                self.repo
                    .diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), opts)?
            }
            None => self.repo.diff_tree_to_tree(None, Some(&commit_tree), opts)?,
        };

        let mut added = 0u64;
        let mut deleted = 0u64;
        for change in changes {
            let (a, d) = self.change_lines(change)?;
            added += a;
            deleted += d;
        }
        Ok((Some(added), Some(deleted)))
    }

    fn change_lines(&self, change: ChangeDetached) -> Result<(u64, u64)> {
        let counts = match change {
            ChangeDetached::Addition { id, .. } => {
                self.blob(id)?.map_or((0, 0), |data| (count_lines(&data), 0))
            }
            ChangeDetached::Deletion { id, .. } => {
                self.blob(id)?.map_or((0, 0), |data| (0, count_lines(&data)))
            }
            ChangeDetached::Modification { previous_id, id, .. } => {
                match (self.blob(previous_id)?, self.blob(id)?) {
                    (Some(old), Some(new)) => line_changes(&old, &new),
                    _ => (0, 0),
                }
            }
            ChangeDetached::Rewrite {
                source_id, id, copy, ..
            } => {
                let added = self.blob(id)?.map_or(0, |data| count_lines(&data));
                let deleted = if copy {
                    0
                } else {
                    self.blob(source_id)?.map_or(0, |data| count_lines(&data))
                };
                (added, deleted)
            }
        };
        Ok(counts)
    }

    /// Text content of a blob; `None` for trees, submodules and binary data.
    fn blob(&self, id: ObjectId) -> Result<Option<Vec<u8>>> {
        if id.is_null() {
            return Ok(None);
        }
        let object = match self.repo.find_object(id) {
            Ok(object) => object,
            // Submodule entries point at commits that are not in this object database.
            Err(_) => return Ok(None),
        };
        if object.kind != gix::object::Kind::Blob || is_binary(&object.data) {
            return Ok(None);
        }
        Ok(Some(object.detach().data))
    }
}

fn to_datetime(seconds: i64, offset: i32) -> Option<DateTime<FixedOffset>> {
    let tz = FixedOffset::east_opt(offset)?;
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(&tz))
}
