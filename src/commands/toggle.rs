//! Toggle command handler
//!
//! Flips `listener.enabled` in the configuration file. A running
//! `steb serve` picks the change up through its config watcher and starts or
//! stops the listener accordingly.

use crate::commands::CommandContext;
use crate::error::Result;

/// Run the toggle command
pub fn run_toggle(ctx: &CommandContext) -> Result<String> {
    let mut config = ctx.load_config()?;
    config.listener.enabled = !config.listener.enabled;
    ctx.save_config(&config)?;

    tracing::debug!(
        "listener.enabled = {} in {}",
        config.listener.enabled,
        ctx.config_path.display()
    );
    let state = if config.listener.enabled {
        "enabled"
    } else {
        "disabled"
    };
    Ok(format!(
        "Listener {} (port {})\n",
        state, config.listener.port
    ))
}
