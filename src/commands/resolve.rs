use crate::core::{
    command_init::{WorkspaceInit, WorkspaceOverrides},
    error::Result,
    notice::LogSink,
    output::print_warning,
};
use colored::*;

/// Print the backend path for each client path.
///
/// Paths are taken verbatim, so Windows-style paths can be checked on any platform.
/// The reason a path could not be mapped is logged by the resolver itself.
pub fn execute_resolve(paths: Vec<String>, overrides: WorkspaceOverrides) -> Result<()> {
    let context = WorkspaceInit::initialize_detached(overrides, LogSink::shared())?;
    let resolver = &context.resolver;

    if resolver.root().is_none() {
        print_warning("No backend root configured; paths pass through unchanged");
    }

    for path in &paths {
        let resolution = resolver.resolve(path);
        let target = match resolution.warning {
            None => resolution.canonical.normal(),
            Some(_) => "not under the backend root".yellow(),
        };
        println!("{} {} {}", path, "->".bright_black(), target);
    }
    Ok(())
}
