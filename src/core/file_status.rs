//! Type-safe versioning status enumeration.
//!
//! This module defines [`FileStatus`], the single value the cache associates with every
//! tracked file. Each status has a short glyph for compact UI annotation and a
//! human-readable description.
//!
//! # Public API
//! - [`FileStatus`]: Enumeration of every state a file can be in relative to the backend
//!
//! # Key Features
//! - **Placeholder state**: [`FileStatus::Unknown`] is the default until a refresh resolves
//! - **git2 integration**: Direct conversion from `git2::Status` flags
//! - **Display formatting**: Consistent glyphs for UI output
//! - **Sorting logic**: Priority ordering so files needing attention are listed first

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last-known versioning state of a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    /// Not yet classified; shown as "pending" by a UI
    #[default]
    Unknown,
    /// File is not tracked by the backend
    NotInBackend,
    /// Checked in and identical to the latest revision
    CheckedInCurrent,
    /// Checked in, but a newer revision exists upstream
    CheckedInStale,
    /// Opened for edit in the workspace
    OpenForEdit,
    /// Opened for add in the workspace
    OpenForAdd,
    /// Opened for delete in the workspace
    OpenForDelete,
    /// Locked against edits
    Locked,
    /// Checked in, but local content differs from the server copy
    Differs,
}

impl FileStatus {
    /// Every status, in declaration order
    pub const ALL: [FileStatus; 9] = [
        FileStatus::Unknown,
        FileStatus::NotInBackend,
        FileStatus::CheckedInCurrent,
        FileStatus::CheckedInStale,
        FileStatus::OpenForEdit,
        FileStatus::OpenForAdd,
        FileStatus::OpenForDelete,
        FileStatus::Locked,
        FileStatus::Differs,
    ];

    /// Map status flags reported by git2 for a single path.
    ///
    /// Staged and conflicted states win over working-tree states. Clean files map to
    /// [`FileStatus::CheckedInCurrent`]; upstream staleness is decided by the caller.
    pub fn from_git2(flags: git2::Status) -> FileStatus {
        if flags.contains(git2::Status::CONFLICTED) {
            return FileStatus::Locked;
        }
        if flags.contains(git2::Status::INDEX_NEW) {
            return FileStatus::OpenForAdd;
        }
        if flags.intersects(git2::Status::INDEX_DELETED | git2::Status::WT_DELETED) {
            return FileStatus::OpenForDelete;
        }
        if flags.intersects(
            git2::Status::INDEX_MODIFIED
                | git2::Status::INDEX_RENAMED
                | git2::Status::INDEX_TYPECHANGE,
        ) {
            return FileStatus::OpenForEdit;
        }
        if flags.intersects(
            git2::Status::WT_MODIFIED | git2::Status::WT_TYPECHANGE | git2::Status::WT_RENAMED,
        ) {
            return FileStatus::Differs;
        }
        if flags.intersects(git2::Status::WT_NEW | git2::Status::IGNORED) {
            return FileStatus::NotInBackend;
        }

        FileStatus::CheckedInCurrent
    }

    /// Short glyph used to annotate a file
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Unknown => "..",
            FileStatus::NotInBackend => "?",
            FileStatus::CheckedInCurrent => "=",
            FileStatus::CheckedInStale => "S",
            FileStatus::OpenForEdit => "E",
            FileStatus::OpenForAdd => "A",
            FileStatus::OpenForDelete => "D",
            FileStatus::Locked => "L",
            FileStatus::Differs => "M",
        }
    }

    /// Get human-readable description for status
    pub fn description(&self) -> &'static str {
        match self {
            FileStatus::Unknown => "pending",
            FileStatus::NotInBackend => "not in backend",
            FileStatus::CheckedInCurrent => "current",
            FileStatus::CheckedInStale => "stale",
            FileStatus::OpenForEdit => "open for edit",
            FileStatus::OpenForAdd => "open for add",
            FileStatus::OpenForDelete => "open for delete",
            FileStatus::Locked => "locked",
            FileStatus::Differs => "differs",
        }
    }

    /// Get sort priority for status ordering, lower values first
    pub fn sort_priority(&self) -> u8 {
        match self {
            // Conflicts and locks need attention first
            FileStatus::Locked => 0,
            FileStatus::OpenForAdd => 1,
            FileStatus::OpenForEdit => 2,
            FileStatus::OpenForDelete => 3,
            FileStatus::Differs => 4,
            FileStatus::CheckedInStale => 5,
            FileStatus::NotInBackend => 6,
            FileStatus::Unknown => 7,
            FileStatus::CheckedInCurrent => 8,
        }
    }

    /// Check whether the file is opened for some pending change in the workspace
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            FileStatus::OpenForEdit | FileStatus::OpenForAdd | FileStatus::OpenForDelete
        )
    }

    /// Check whether the backend knows about this file
    pub fn is_tracked(&self) -> bool {
        !matches!(self, FileStatus::Unknown | FileStatus::NotInBackend)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(FileStatus::default(), FileStatus::Unknown);
    }

    #[test]
    fn test_glyphs_are_unique() {
        let mut glyphs: Vec<&str> = FileStatus::ALL.iter().map(|s| s.as_str()).collect();
        glyphs.sort();
        glyphs.dedup();
        assert_eq!(glyphs.len(), FileStatus::ALL.len());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FileStatus::OpenForEdit), "E");
        assert_eq!(format!("{}", FileStatus::Unknown), "..");
    }

    #[test]
    fn test_sort_priority() {
        assert_eq!(FileStatus::Locked.sort_priority(), 0);
        assert!(FileStatus::OpenForEdit.sort_priority() < FileStatus::Differs.sort_priority());
        assert!(
            FileStatus::Unknown.sort_priority() < FileStatus::CheckedInCurrent.sort_priority()
        );
    }

    #[test]
    fn test_tracking_properties() {
        assert!(FileStatus::OpenForAdd.is_open());
        assert!(!FileStatus::Differs.is_open());
        assert!(FileStatus::CheckedInStale.is_tracked());
        assert!(!FileStatus::NotInBackend.is_tracked());
        assert!(!FileStatus::Unknown.is_tracked());
    }

    #[test]
    fn test_from_git2_flags() {
        assert_eq!(
            FileStatus::from_git2(git2::Status::CURRENT),
            FileStatus::CheckedInCurrent
        );
        assert_eq!(
            FileStatus::from_git2(git2::Status::INDEX_NEW),
            FileStatus::OpenForAdd
        );
        assert_eq!(
            FileStatus::from_git2(git2::Status::INDEX_MODIFIED | git2::Status::WT_MODIFIED),
            FileStatus::OpenForEdit
        );
        assert_eq!(
            FileStatus::from_git2(git2::Status::WT_MODIFIED),
            FileStatus::Differs
        );
        assert_eq!(
            FileStatus::from_git2(git2::Status::WT_DELETED),
            FileStatus::OpenForDelete
        );
        assert_eq!(
            FileStatus::from_git2(git2::Status::WT_NEW),
            FileStatus::NotInBackend
        );
        assert_eq!(
            FileStatus::from_git2(git2::Status::CONFLICTED | git2::Status::INDEX_MODIFIED),
            FileStatus::Locked
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FileStatus::CheckedInStale).unwrap();
        assert_eq!(json, "\"CheckedInStale\"");
    }
}
