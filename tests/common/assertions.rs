//! Common assertion helpers for test output validation
//!
//! Provides predicates for validating vcs-status command output and error messages.

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for workspace error messages
pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
        .or(predicates::str::contains("Not in a version-controlled workspace"))
}

/// Creates a predicate that checks for the status listing header
pub fn has_status_header(count: usize) -> impl Predicate<str> {
    predicates::str::contains(format!("Status of {count} files"))
}

/// Creates a predicate that checks for a status description
pub fn has_status(description: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("({description})"))
}

/// Creates a predicate that checks for one resolved path line
pub fn resolves_to(path: &str, canonical: &str) -> impl Predicate<str> {
    predicates::str::contains(path).and(predicates::str::contains(canonical))
}

/// Creates a predicate that checks for the outside-root warning
pub fn not_under_root() -> impl Predicate<str> {
    predicates::str::contains("is not under the backend root")
}
