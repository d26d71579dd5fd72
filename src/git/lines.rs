use similar::{ChangeTag, TextDiff};

const BINARY_PROBE: usize = 8192;

/// Same heuristic as git: a NUL byte near the start marks a blob as binary.
pub fn is_binary(data: &[u8]) -> bool {
    data.iter().take(BINARY_PROBE).any(|&b| b == 0)
}

pub fn count_lines(data: &[u8]) -> u64 {
    String::from_utf8_lossy(data).lines().count() as u64
}

/// Inserted and deleted line counts between two blob versions.
pub fn line_changes(old: &[u8], new: &[u8]) -> (u64, u64) {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(old.as_ref(), new.as_ref());

    let mut added = 0;
    let mut deleted = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}
