//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories and for running the binary
//! against them with an isolated settings directory.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use vcs_status_cache::core::dirs::CONFIG_DIR_ENV;

/// Test repository setup result. Both temporary directories must be kept alive for
/// the duration of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
    /// Settings directory, kept outside the repository so it is never scanned
    pub config_dir: TempDir,
}

impl TestRepo {
    /// Get the repository path as a reference
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The binary, run inside the repository with isolated settings
    pub fn command(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("vcs-status")?;
        cmd.current_dir(&self.path)
            .env(CONFIG_DIR_ENV, self.config_dir.path())
            .env("NO_COLOR", "1");
        Ok(cmd)
    }
}

fn git(repo_path: &Path, args: &[&str]) -> anyhow::Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    anyhow::ensure!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

/// Sets up a fresh git repository for testing
///
/// Creates a temporary directory, initializes it as a git repository on branch
/// `main`, and sets up basic git configuration to avoid user prompts.
pub fn setup_test_repo() -> anyhow::Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let config_dir = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init"])?;
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
        config_dir,
    })
}

/// Sets up a git repository with an initial commit containing "initial.txt"
pub fn setup_test_repo_with_initial_commit() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git_add(&repo.path, "initial.txt")?;
    git_commit(&repo.path, "Initial commit")?;

    Ok(repo)
}

/// Creates a file with specified content in the repository
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> anyhow::Result<()> {
    fs::write(repo_path.join(filename), content)?;
    Ok(())
}

/// Creates a directory (and its parents) in the repository
pub fn create_dir(repo_path: &Path, dirname: &str) -> anyhow::Result<()> {
    fs::create_dir_all(repo_path.join(dirname))?;
    Ok(())
}

/// Adds a file to the git index ("." for all files)
pub fn git_add(repo_path: &Path, filename: &str) -> anyhow::Result<()> {
    git(repo_path, &["add", filename])
}

/// Creates a git commit with the specified message
pub fn git_commit(repo_path: &Path, message: &str) -> anyhow::Result<()> {
    git(repo_path, &["commit", "-m", message])
}

/// Creates and switches to a new branch
pub fn git_checkout_new_branch(repo_path: &Path, branch: &str) -> anyhow::Result<()> {
    git(repo_path, &["checkout", "-b", branch])
}

/// Removes a file from the filesystem (not from git)
pub fn remove_file(repo_path: &Path, filename: &str) -> anyhow::Result<()> {
    fs::remove_file(repo_path.join(filename))?;
    Ok(())
}

/// Creates multiple test files with sequential content
pub fn create_test_files(repo_path: &Path, filenames: &[&str]) -> anyhow::Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        let content = format!("content{}\nline 2\n", i + 1);
        create_file(repo_path, filename, &content)?;
    }
    Ok(())
}

/// Modifies multiple test files with new content
pub fn modify_test_files(repo_path: &Path, filenames: &[&str]) -> anyhow::Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        let content = format!("modified{}\nline 2\nnew line\n", i + 1);
        create_file(repo_path, filename, &content)?;
    }
    Ok(())
}

/// Clones `source` into a fresh temporary directory; `main` tracks `origin/main`
pub fn clone_test_repo(source: &Path) -> anyhow::Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let config_dir = TempDir::new()?;
    let repo_path = temp_dir.path().to_path_buf();

    let source = source.to_string_lossy().into_owned();
    let target = repo_path.to_string_lossy().into_owned();
    git(&repo_path, &["clone", &source, &target])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
        config_dir,
    })
}

/// Fetches from `origin` without merging
pub fn git_fetch(repo_path: &Path) -> anyhow::Result<()> {
    git(repo_path, &["fetch", "origin"])
}
