use anyhow::Context;
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use vcs_status_cache::commands::*;
use vcs_status_cache::core::{
    command_init::WorkspaceOverrides, error::StatusCacheError, print_error,
};

#[derive(Parser)]
#[command(name = "vcs-status")]
#[command(about = "Live version-control status for large project trees")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of files under the backend root
    Status {
        /// Files to query (defaults to every file under the root)
        paths: Vec<PathBuf>,
        /// Workspace directory (defaults to the repository containing the current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,
        /// Backend root (defaults to the workspace)
        #[arg(long)]
        root: Option<String>,
        /// Stream prefixed to backend paths (defaults to the current branch)
        #[arg(long)]
        stream: Option<String>,
        /// Print JSON instead of colored lines
        #[arg(long)]
        json: bool,
    },
    /// Print the backend path for client paths
    Resolve {
        /// Client paths, taken verbatim
        #[arg(required = true)]
        paths: Vec<String>,
        #[arg(long)]
        workspace: Option<PathBuf>,
        #[arg(long)]
        root: Option<String>,
        #[arg(long)]
        stream: Option<String>,
    },
    /// Show or change persisted settings
    Config {
        /// Print settings after applying changes
        #[arg(long)]
        show: bool,
        #[arg(long)]
        workspace: Option<PathBuf>,
        /// Backend server address
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        root: Option<String>,
        #[arg(long)]
        stream: Option<String>,
        /// Files per backend request
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Treat paths outside the root as errors (true) or pass them through (false)
        #[arg(long)]
        enforce_root: Option<bool>,
        /// Virtual drive mapping, e.g. "X:=C:\work\project" (repeatable)
        #[arg(long = "map-drive", value_name = "DRIVE=TARGET")]
        map_drive: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = run(cli.command) {
        match e.downcast_ref::<StatusCacheError>() {
            Some(StatusCacheError::NotInWorkspace) => print_error("Not in a git repository"),
            _ => print_error(&format!("{e:#}")),
        }
        std::process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Status {
            paths,
            workspace,
            root,
            stream,
            json,
        } => execute_status(StatusOptions {
            paths,
            overrides: WorkspaceOverrides {
                workspace,
                root,
                stream,
            },
            json,
        })?,
        Commands::Resolve {
            paths,
            workspace,
            root,
            stream,
        } => execute_resolve(
            paths,
            WorkspaceOverrides {
                workspace,
                root,
                stream,
            },
        )?,
        Commands::Config {
            show,
            workspace,
            server,
            root,
            stream,
            chunk_size,
            enforce_root,
            map_drive,
        } => execute_config(ConfigOptions {
            show,
            workspace,
            server,
            root,
            stream,
            chunk_size,
            enforce_root,
            map_drive,
        })
        .context("Could not update settings")?,
    }
    Ok(())
}
