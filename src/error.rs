use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

/// Coarse failure classes surfaced to the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RepositoryAccess,
    DataIntegrity,
    MalformedInput,
    FileSystem,
    Render,
}

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Cannot open repository at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<gix::open::Error>,
    },
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
    #[error("Commit {commit} has no usable {field}")]
    DataIntegrity { commit: String, field: &'static str },
    #[error("Malformed input {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },
    #[error("Failed to write {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Render error: {0}")]
    Render(String),
}

impl PulseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PulseError::Open { .. }
            | PulseError::GitRepo(_)
            | PulseError::ObjectFind(_)
            | PulseError::ObjectFindConv(_)
            | PulseError::Commit(_)
            | PulseError::RefFind(_)
            | PulseError::HeadPeel(_)
            | PulseError::DiffTreeToTree(_) => ErrorKind::RepositoryAccess,
            PulseError::DataIntegrity { .. } => ErrorKind::DataIntegrity,
            PulseError::MalformedInput { .. } => ErrorKind::MalformedInput,
            PulseError::FileSystem { .. } => ErrorKind::FileSystem,
            PulseError::Render(_) => ErrorKind::Render,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PulseError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PulseError::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render(err: impl std::fmt::Display) -> Self {
        PulseError::Render(err.to_string())
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::object::find::existing::Error> for PulseError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        PulseError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for PulseError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        PulseError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for PulseError {
    fn from(err: gix::object::commit::Error) -> Self {
        PulseError::Commit(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for PulseError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        PulseError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for PulseError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        PulseError::HeadPeel(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for PulseError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        PulseError::DiffTreeToTree(Box::new(err))
    }
}
