mod lines;
mod repo;

pub use lines::{count_lines, is_binary, line_changes};
pub use repo::{CommitWalk, GitRepo};

use crate::error::Result;
use crate::model::RawCommit;

/// A finite, single-pass history. Every commit is yielded exactly once.
pub trait CommitSource {
    type Commits: Iterator<Item = Result<RawCommit>>;

    fn into_commits(self) -> Self::Commits;
}

impl CommitSource for Vec<RawCommit> {
    type Commits = std::iter::Map<std::vec::IntoIter<RawCommit>, fn(RawCommit) -> Result<RawCommit>>;

    fn into_commits(self) -> Self::Commits {
        self.into_iter().map(Ok as fn(RawCommit) -> Result<RawCommit>)
    }
}
