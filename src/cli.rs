//! CLI argument definitions using clap with subcommand architecture

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Shell-to-editor bridge
#[derive(Parser, Debug)]
#[command(name = "steb")]
#[command(about = "Open files, projects and compares in an editor from the shell")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true, env = "STEB_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for steb
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the command listener (JSON events on stdout)
    Serve(ServeArgs),

    /// Send a command to a running listener
    #[command(visible_alias = "o")]
    Open(OpenArgs),

    /// Flip listener.enabled in the configuration file
    Toggle,

    /// Manage steb configuration
    Config(ConfigArgs),
}

// ============================================
// Serve Subcommand
// ============================================

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen on this port instead of the configured one
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Start the listener even if it is disabled in the configuration
    #[arg(long)]
    pub enable: bool,

    /// Do not react to configuration file changes
    #[arg(long)]
    pub no_watch: bool,
}

// ============================================
// Open Subcommand
// ============================================

/// Arguments for the open command
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Open the directory as a project
    #[arg(short = 'p', long, conflicts_with = "compare")]
    pub project: bool,

    /// Compare two files
    #[arg(short = 'c', long)]
    pub compare: bool,

    /// Send to this port instead of the configured one
    #[arg(long)]
    pub port: Option<u16>,

    /// Path(s) to open
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

// ============================================
// Config Subcommand
// ============================================

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config operation: show, set, reset, path
    #[command(subcommand)]
    pub operation: ConfigOperation,
}

/// Config subcommand operations
#[derive(Subcommand, Debug)]
pub enum ConfigOperation {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., listener.port, listener.enabled, logging.level)
        key: String,
        /// Value to set
        value: String,
    },

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}
