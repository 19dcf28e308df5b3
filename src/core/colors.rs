//! Unified color system for status glyphs.
//!
//! Every place that prints a [`FileStatus`] goes through this module so the same state
//! always gets the same color.
//!
//! # Public API
//! - [`get_status_color_style`]: Get color function for a status
//! - [`get_aligned_status`]: Colored glyph padded to a fixed width
//! - [`get_colored_path`]: Apply status color to a file path
//! - [`format_file_status`]: Complete file line formatting
//!
//! # Color Scheme
//! - **Open for add/edit/delete**: Green, yellow, red
//! - **Differs**: Magenta, **Stale**: Blue, **Locked**: Red bold
//! - **Current**: Dimmed, **Not in backend**: Cyan, **Pending**: Bright black

use crate::core::file_status::FileStatus;
use colored::*;

/// Width every glyph is padded to
const GLYPH_WIDTH: usize = 2;

/// Returns a closure that applies the color for `status` to any text
pub fn get_status_color_style(status: FileStatus) -> Box<dyn Fn(&str) -> ColoredString> {
    match status {
        FileStatus::Unknown => Box::new(|text: &str| text.bright_black()),
        FileStatus::NotInBackend => Box::new(|text: &str| text.cyan()),
        FileStatus::CheckedInCurrent => Box::new(|text: &str| text.dimmed()),
        FileStatus::CheckedInStale => Box::new(|text: &str| text.blue()),
        FileStatus::OpenForEdit => Box::new(|text: &str| text.yellow()),
        FileStatus::OpenForAdd => Box::new(|text: &str| text.green()),
        FileStatus::OpenForDelete => Box::new(|text: &str| text.red()),
        FileStatus::Locked => Box::new(|text: &str| text.red().bold()),
        FileStatus::Differs => Box::new(|text: &str| text.magenta()),
    }
}

/// Get colored status glyph padded for alignment
pub fn get_aligned_status(status: FileStatus) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(&format!("{:<GLYPH_WIDTH$}", status.as_str()))
}

/// Get colored file path using the status color
pub fn get_colored_path(status: FileStatus, path: &str) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(path)
}

/// One output line: glyph, path and a muted description
pub fn format_file_status(status: FileStatus, path: &str) -> String {
    format!(
        "{} {} {}",
        get_aligned_status(status),
        get_colored_path(status, path),
        format!("({})", status.description()).bright_black()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_open_for_edit() {
        let result = format_file_status(FileStatus::OpenForEdit, "src/main.rs");
        assert!(result.contains("E"));
        assert!(result.contains("src/main.rs"));
        assert!(result.contains("(open for edit)"));
    }

    #[test]
    fn test_get_aligned_status() {
        colored::control::set_override(false);
        assert_eq!(get_aligned_status(FileStatus::Differs).to_string(), "M ");
        assert_eq!(get_aligned_status(FileStatus::Unknown).to_string(), "..");
        colored::control::unset_override();
    }

    #[test]
    fn test_status_color_style_consistency() {
        for status in FileStatus::ALL {
            let color_fn = get_status_color_style(status);
            assert_eq!(color_fn("test").to_string(), color_fn("test").to_string());
        }
    }
}
