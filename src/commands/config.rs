//! Config command handler

use crate::cli::{ConfigArgs, ConfigOperation};
use crate::commands::CommandContext;
use crate::error::Result;

/// Run the config command
pub fn run_config(args: &ConfigArgs, ctx: &CommandContext) -> Result<String> {
    match &args.operation {
        ConfigOperation::Show => show_config(ctx),
        ConfigOperation::Set { key, value } => set_config(ctx, key, value),
        ConfigOperation::Reset => reset_config(ctx),
        ConfigOperation::Path => Ok(format!("{}\n", ctx.config_path.display())),
    }
}

/// Show current configuration
fn show_config(ctx: &CommandContext) -> Result<String> {
    let config = ctx.load_config()?;
    let mut output = format!("# {}\n", ctx.config_path.display());
    output.push_str(&config.display());
    Ok(output)
}

/// Set a configuration value
fn set_config(ctx: &CommandContext, key: &str, value: &str) -> Result<String> {
    let mut config = ctx.load_config()?;
    config.set(key, value)?;
    ctx.save_config(&config)?;
    let shown = config.get(key).unwrap_or_default();
    Ok(format!("Set {} = {}\n", key, shown))
}

/// Reset configuration to defaults
fn reset_config(ctx: &CommandContext) -> Result<String> {
    let mut config = ctx.load_config()?;
    config.reset();
    ctx.save_config(&config)?;
    Ok("Configuration reset to defaults\n".to_string())
}
