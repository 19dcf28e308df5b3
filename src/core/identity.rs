//! Cache key for a client-side file.
//!
//! A [`FileIdentity`] keeps the path exactly as the client reported it (minus stray
//! whitespace and trailing separators) for display, and compares by a folded key so
//! `C:\Proj\A.cs` and `c:/proj/a.cs` name the same file.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalized absolute client-side path with case-insensitive comparison.
#[derive(Clone)]
pub struct FileIdentity {
    path: String,
    key: String,
}

impl FileIdentity {
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = normalize(path.as_ref());
        // ASCII folding, matching how the resolver compares roots
        let key = path.replace('\\', "/").to_ascii_lowercase();
        Self { path, key }
    }

    /// The path as reported by the client
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Folded comparison key
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_trailing = trimmed.trim_end_matches(['/', '\\']);
    // Keep a bare root ("/" or "C:\") intact
    if without_trailing.is_empty() || without_trailing.ends_with(':') {
        return trimmed.to_string();
    }
    without_trailing.to_string()
}

impl PartialEq for FileIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FileIdentity {}

impl Hash for FileIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for FileIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Debug for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileIdentity").field(&self.path).finish()
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for FileIdentity {
    fn from(path: &str) -> Self {
        FileIdentity::new(path)
    }
}

impl From<String> for FileIdentity {
    fn from(path: String) -> Self {
        FileIdentity::new(path)
    }
}

impl From<&std::path::Path> for FileIdentity {
    fn from(path: &std::path::Path) -> Self {
        FileIdentity::new(path.to_string_lossy())
    }
}

impl Serialize for FileIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path)
    }
}

impl<'de> Deserialize<'de> for FileIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        Ok(FileIdentity::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(
            FileIdentity::new(r"C:\Proj\Src\A.cs"),
            FileIdentity::new(r"c:\proj\src\a.cs")
        );
    }

    #[test]
    fn test_only_ascii_case_is_folded() {
        assert_eq!(FileIdentity::new("/Proj/ÄB.rs").key(), "/proj/Äb.rs");
        assert_ne!(FileIdentity::new("/proj/Ä.rs"), FileIdentity::new("/proj/ä.rs"));
    }

    #[test]
    fn test_separator_insensitive_equality() {
        assert_eq!(
            FileIdentity::new(r"C:\proj\a.cs"),
            FileIdentity::new("C:/proj/a.cs")
        );
    }

    #[test]
    fn test_keeps_display_form() {
        let id = FileIdentity::new(r"  C:\Proj\A.cs  ");
        assert_eq!(id.as_str(), r"C:\Proj\A.cs");
        assert_eq!(id.to_string(), r"C:\Proj\A.cs");
    }

    #[test]
    fn test_trailing_separator_removed_except_root() {
        assert_eq!(FileIdentity::new("/home/me/proj/").as_str(), "/home/me/proj");
        assert_eq!(FileIdentity::new("/").as_str(), "/");
        assert_eq!(FileIdentity::new(r"C:\").as_str(), r"C:\");
    }

    #[test]
    fn test_hash_set_dedup() {
        let mut set = HashSet::new();
        set.insert(FileIdentity::new("/Proj/a.rs"));
        set.insert(FileIdentity::new("/proj/A.rs"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = FileIdentity::new("/proj/a.rs");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"/proj/a.rs\"");
        let back: FileIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
