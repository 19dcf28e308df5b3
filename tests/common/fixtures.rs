//! Test data generation utilities and predefined scenarios
//!
//! Provides functions for creating repositories with specific file states
//! to test status reporting consistently.

#![allow(dead_code)]

use super::repository::*;

/// Scenario: one file in every local state git can express
///
/// - `clean.txt`: committed, untouched
/// - `edited.txt`: committed, modified in the working tree
/// - `removed.txt`: committed, deleted from the working tree
/// - `staged.txt`: new, added to the index
/// - `untracked.txt`: new, not added
pub fn create_mixed_state_repo() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_test_files(&repo.path, &["clean.txt", "edited.txt", "removed.txt"])?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Initial commit")?;

    modify_test_files(&repo.path, &["edited.txt"])?;
    remove_file(&repo.path, "removed.txt")?;
    create_file(&repo.path, "staged.txt", "staged\n")?;
    git_add(&repo.path, "staged.txt")?;
    create_file(&repo.path, "untracked.txt", "untracked\n")?;

    Ok(repo)
}

/// Scenario: committed files in nested directories, all clean
pub fn create_nested_repo() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_dir(&repo.path, "src/core")?;
    create_file(&repo.path, "src/main.rs", "fn main() {}\n")?;
    create_file(&repo.path, "src/core/mod.rs", "pub mod cache;\n")?;
    create_file(&repo.path, "README.md", "# project\n")?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Initial commit")?;

    Ok(repo)
}
