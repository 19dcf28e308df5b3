use crate::core::{
    config::Settings,
    error::{Result, StatusCacheError},
    output::print_success,
};
use std::path::PathBuf;

/// Changes requested on the command line; `None` leaves a value alone
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    pub show: bool,
    pub workspace: Option<PathBuf>,
    pub server: Option<String>,
    pub root: Option<String>,
    pub stream: Option<String>,
    pub chunk_size: Option<usize>,
    pub enforce_root: Option<bool>,
    /// `DRIVE=TARGET` pairs, e.g. `X:=C:\work\project`
    pub map_drive: Vec<String>,
}

pub fn execute_config(options: ConfigOptions) -> Result<()> {
    let mut settings = Settings::load_or_default()?;
    let changed = apply_options(&mut settings, &options)?;

    if changed {
        let path = settings.save()?;
        print_success(&format!("Settings saved to {}", path.display()));
    }
    if options.show || !changed {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    }
    Ok(())
}

/// Apply `options` to `settings`, returning whether anything changed
fn apply_options(settings: &mut Settings, options: &ConfigOptions) -> Result<bool> {
    let before = settings.clone();

    if let Some(workspace) = &options.workspace {
        settings.server.workspace = Some(workspace.clone());
    }
    if let Some(server) = &options.server {
        settings.server.server = Some(server.clone());
    }
    if let Some(root) = &options.root {
        settings.root = Some(root.clone());
    }
    if let Some(stream) = &options.stream {
        settings.stream = Some(stream.clone());
    }
    if let Some(chunk_size) = options.chunk_size {
        settings.chunk_size = chunk_size.max(1);
    }
    if let Some(enforce_root) = options.enforce_root {
        settings.enforce_root = enforce_root;
    }
    for mapping in &options.map_drive {
        let (drive, target) = parse_drive_mapping(mapping)?;
        settings.drive_mappings.insert(drive, target);
    }

    Ok(*settings != before)
}

fn parse_drive_mapping(value: &str) -> Result<(String, String)> {
    let (drive, target) = value
        .split_once('=')
        .ok_or_else(|| StatusCacheError::invalid_drive_mapping(value))?;
    let drive = drive.trim();
    let target = target.trim();
    if drive.is_empty() || target.is_empty() {
        return Err(StatusCacheError::invalid_drive_mapping(value));
    }
    Ok((drive.to_ascii_uppercase(), target.to_string()))
}
