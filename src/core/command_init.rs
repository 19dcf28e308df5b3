//! Centralized initialization for workspace commands.
//!
//! [`WorkspaceInit`] merges persisted [`Settings`] with command line overrides and
//! builds the [`PathResolver`] every command needs, so `status` and `resolve` agree on
//! root, stream and indirection.
//!
//! # Initialization Steps
//! 1. **Settings**: Load `settings.json`, falling back to defaults
//! 2. **Workspace**: Flag, then settings, then discovery from the current directory
//! 3. **Root and stream**: Flag, then settings, then workspace / current branch
//! 4. **Resolver**: Drive mappings when configured, symlink resolution otherwise

use crate::core::{
    config::Settings,
    error::Result,
    git_backend::{current_branch, discover_workspace},
    indirection::{PathIndirection, SymlinkIndirection},
    notice::NoticeSink,
    resolver::PathResolver,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Command line values that take precedence over settings
#[derive(Debug, Default, Clone)]
pub struct WorkspaceOverrides {
    pub workspace: Option<PathBuf>,
    pub root: Option<String>,
    pub stream: Option<String>,
}

/// Everything a workspace command needs
pub struct WorkspaceContext {
    pub settings: Settings,
    pub workspace: Option<PathBuf>,
    pub resolver: Arc<PathResolver>,
}

pub struct WorkspaceInit;

impl WorkspaceInit {
    /// Initialize for a command that needs a version-controlled workspace
    pub fn initialize(
        overrides: WorkspaceOverrides,
        sink: Arc<dyn NoticeSink>,
    ) -> Result<WorkspaceContext> {
        let settings = Settings::load_or_default()?;
        Self::initialize_with(settings, overrides, sink, true)
    }

    /// Initialize for a command that can run without a workspace
    pub fn initialize_detached(
        overrides: WorkspaceOverrides,
        sink: Arc<dyn NoticeSink>,
    ) -> Result<WorkspaceContext> {
        let settings = Settings::load_or_default()?;
        Self::initialize_with(settings, overrides, sink, false)
    }

    pub fn initialize_with(
        mut settings: Settings,
        overrides: WorkspaceOverrides,
        sink: Arc<dyn NoticeSink>,
        require_workspace: bool,
    ) -> Result<WorkspaceContext> {
        let workspace = match overrides
            .workspace
            .or_else(|| settings.server.workspace.clone())
        {
            Some(workspace) => Some(workspace),
            None => {
                let current_dir = std::env::current_dir()?;
                match discover_workspace(&current_dir) {
                    Ok(workspace) => Some(workspace),
                    Err(e) if require_workspace => return Err(e),
                    Err(_) => None,
                }
            }
        };
        settings.server.workspace = workspace.clone();
        if let Some(root) = overrides.root {
            settings.root = Some(root);
        }

        let stream = overrides.stream.or_else(|| settings.stream.clone()).or_else(|| {
            workspace
                .as_deref()
                .and_then(|workspace| current_branch(workspace).ok().flatten())
        });
        log::debug!(
            "Workspace {:?}, root {:?}, stream {:?}",
            workspace,
            settings.effective_root(),
            stream
        );

        let indirection: Arc<dyn PathIndirection> = if settings.drive_mappings.is_empty() {
            Arc::new(SymlinkIndirection)
        } else {
            Arc::new(settings.drive_mappings())
        };
        let resolver = PathResolver::new(indirection, sink)
            .with_root_enforcement(settings.enforce_root);
        resolver.set_stream(stream.as_deref());
        if let Some(root) = settings.effective_root() {
            resolver.set_root(&root);
        }

        Ok(WorkspaceContext {
            settings,
            workspace,
            resolver: Arc::new(resolver),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notice::MemorySink;

    #[test]
    fn test_overrides_win_over_settings() {
        let mut settings = Settings::default();
        settings.root = Some("/from/settings".to_string());
        settings.stream = Some("settings-stream".to_string());
        settings.server.workspace = Some(PathBuf::from("/ws"));

        let context = WorkspaceInit::initialize_with(
            settings,
            WorkspaceOverrides {
                workspace: None,
                root: Some("/from/flag".to_string()),
                stream: Some("flag-stream".to_string()),
            },
            MemorySink::new(),
            true,
        )
        .unwrap();

        assert_eq!(context.workspace, Some(PathBuf::from("/ws")));
        assert_eq!(context.resolver.root().as_deref(), Some("/from/flag/"));
        assert_eq!(context.resolver.stream().as_deref(), Some("flag-stream"));
    }

    #[test]
    fn test_drive_mappings_select_indirection() {
        let mut settings = Settings::default();
        settings.server.workspace = Some(PathBuf::from(r"C:\work\proj"));
        settings.stream = Some("main".to_string());
        settings
            .drive_mappings
            .insert("X:".to_string(), r"C:\work\proj".to_string());

        let context = WorkspaceInit::initialize_with(
            settings,
            WorkspaceOverrides::default(),
            MemorySink::new(),
            true,
        )
        .unwrap();

        let resolution = context.resolver.resolve(r"X:\src\a.cs");
        assert_eq!(resolution.canonical, "main/src/a.cs");
    }
}
