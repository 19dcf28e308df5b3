use crate::core::{
    cache::{CacheEvent, RefreshBatch, RefreshOutcome, StatusCache},
    colors::format_file_status,
    command_init::{WorkspaceInit, WorkspaceOverrides},
    error::{Result, StatusCacheError},
    file_status::FileStatus,
    git_backend::GitConnector,
    identity::FileIdentity,
    notice::LogSink,
    output::print_section_header,
};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};

#[derive(Debug, Default, Clone)]
pub struct StatusOptions {
    /// Files to query; everything under the root when empty
    pub paths: Vec<PathBuf>,
    pub overrides: WorkspaceOverrides,
    pub json: bool,
}

/// One reported file
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusLine {
    pub path: String,
    pub canonical: String,
    pub status: FileStatus,
    pub glyph: &'static str,
}

pub fn execute_status(options: StatusOptions) -> Result<()> {
    let context = WorkspaceInit::initialize(options.overrides, LogSink::shared())?;
    let workspace = context
        .workspace
        .clone()
        .ok_or(StatusCacheError::NotInWorkspace)?;

    let files = if options.paths.is_empty() {
        let scan_root = context
            .settings
            .root
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace.clone());
        collect_files(&scan_root)?
    } else {
        let current_dir = env::current_dir()?;
        options
            .paths
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    current_dir.join(path)
                }
            })
            .collect()
    };
    log::debug!("Querying status of {} files", files.len());

    let connector = match context.resolver.actual_root() {
        Some(root) => GitConnector::for_root(root),
        None => GitConnector::new(),
    };
    let cache: StatusCache = StatusCache::with_chunk_size(
        Arc::clone(&context.resolver),
        Arc::new(connector),
        context.settings.server.clone(),
        LogSink::shared(),
        context.settings.chunk_size,
    );

    let (sender, receiver) = mpsc::channel();
    let sender = Mutex::new(sender);
    cache.subscribe(move |event| {
        if let CacheEvent::Completed(completed) = event {
            if let Ok(sender) = sender.lock() {
                let _ = sender.send(completed.outcome.clone());
            }
        }
    });

    cache.initialize(RefreshBatch::of(files.iter().map(PathBuf::as_path)))?;
    let active = cache.wait_until_current();
    if let Ok(RefreshOutcome::Failed(message)) = receiver.recv() {
        return Err(StatusCacheError::refresh_failed(message));
    }
    if !active {
        return Err(StatusCacheError::refresh_failed("status cache is inactive"));
    }

    let mut lines = Vec::with_capacity(files.len());
    for file in &files {
        let identity = FileIdentity::from(file.as_path());
        // Memoized by the refresh; outside-root warnings were logged there
        let resolution = context.resolver.resolve(identity.as_str());
        let status = cache.lookup(&identity);
        lines.push(StatusLine {
            path: display_path(file, &workspace),
            canonical: resolution.canonical,
            status,
            glyph: status.as_str(),
        });
    }
    lines.sort_by(|a, b| {
        a.status
            .sort_priority()
            .cmp(&b.status.sort_priority())
            .then_with(|| a.path.cmp(&b.path))
    });

    if options.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    let header = match context.resolver.stream() {
        Some(stream) => format!("Status of {} files on {}", lines.len(), stream),
        None => format!("Status of {} files", lines.len()),
    };
    print_section_header(&header);
    if lines.is_empty() {
        println!("  No files found");
    }
    for line in &lines {
        println!("  {}", format_file_status(line.status, &line.path));
    }
    println!();
    Ok(())
}

/// Every file under `dir`, skipping `.git`, sorted
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            if entry.file_name() == ".git" {
                continue;
            }
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Workspace-relative path with forward slashes when possible
fn display_path(file: &Path, workspace: &Path) -> String {
    match file.strip_prefix(workspace) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => file.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_skips_git_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/nested/b.rs"), "").unwrap();
        fs::write(root.join("src/a.rs"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let files = collect_files(root).unwrap();
        let relative: Vec<String> = files.iter().map(|f| display_path(f, root)).collect();
        assert_eq!(relative, vec!["README.md", "src/a.rs", "src/nested/b.rs"]);
    }

    #[test]
    fn test_display_path_outside_workspace() {
        let path = display_path(Path::new("/elsewhere/a.txt"), Path::new("/ws"));
        assert_eq!(path, "/elsewhere/a.txt");
        assert_eq!(display_path(Path::new("/ws/src/a.txt"), Path::new("/ws")), "src/a.txt");
    }

    #[test]
    fn test_status_line_serializes_status_name() {
        let line = StatusLine {
            path: "src/a.rs".to_string(),
            canonical: "main/src/a.rs".to_string(),
            status: FileStatus::OpenForAdd,
            glyph: FileStatus::OpenForAdd.as_str(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["path"], "src/a.rs");
        assert_eq!(json["canonical"], "main/src/a.rs");
        assert_eq!(json["glyph"], "A");
    }
}
