//! Command modules for the steb CLI
//!
//! ## Architecture
//!
//! Each command module implements a single top-level command:
//! - `serve` - Run the listener with the built-in editor host
//! - `open` - Client side: send one command line to a running listener
//! - `toggle` - Flip `listener.enabled` in the configuration file
//! - `config` - Show, set or reset configuration values
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` for the configuration location.

pub mod config;
pub mod open;
pub mod serve;
pub mod toggle;

// Re-export command handlers for easy access
pub use config::run_config;
pub use open::run_open;
pub use serve::run_serve;
pub use toggle::run_toggle;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::config::StebConfig;
use crate::error::Result;

/// Shared context passed to all command handlers
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Configuration file every command reads and writes
    pub config_path: PathBuf,
    /// Log at debug level regardless of configuration
    pub verbose: bool,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args
    pub fn from_cli(config: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let config_path = match config {
            Some(path) => path,
            None => StebConfig::default_path()?,
        };
        Ok(Self {
            config_path,
            verbose,
        })
    }

    /// Initialize logging to stderr at `level`, or debug when verbose.
    ///
    /// `RUST_LOG` takes precedence when set. Safe to call more than once.
    pub fn init_tracing(&self, level: &str) {
        let level = if self.verbose { "debug" } else { level };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("steb={}", level)));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Load the configuration this context points at
    pub fn load_config(&self) -> Result<StebConfig> {
        StebConfig::load_from(&self.config_path)
    }

    /// Persist a configuration to this context's file
    pub fn save_config(&self, config: &StebConfig) -> Result<()> {
        config.save_to(&self.config_path)
    }
}
