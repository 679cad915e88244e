//! Serve command handler
//!
//! Composition root for the listener:
//!
//! - The calling (main) thread becomes the UI thread and runs the
//!   `StdoutEditorHost`, which reports every action as a JSON line on stdout.
//! - `ListenerService` starts the accept thread if the configuration is
//!   enabled.
//! - A `ConfigWatcher` feeds configuration edits (`steb toggle`,
//!   `steb config set`, hand edits) to `ListenerService::on_config_changed`.
//! - Ctrl-C stops the listener and ends the UI loop.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use anyhow::Context;

use crate::cli::ServeArgs;
use crate::commands::CommandContext;
use crate::config::{parse_port, StebConfig};
use crate::error::{BindError, Result};
use crate::gateway::{ui_channel, UiDispatcher};
use crate::server::{ConfigWatcher, ListenerService, StdoutEditorHost, WatcherHandle};

/// Run the listener until Ctrl-C
pub fn run_serve(args: &ServeArgs, ctx: &CommandContext) -> Result<String> {
    let mut config = ctx.load_config()?;
    ctx.init_tracing(&config.logging.level);

    if let Some(port) = args.port {
        config.listener.port = parse_port(&port.to_string())?;
    }
    if args.enable {
        config.listener.enabled = true;
    }

    tracing::info!("Starting steb v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Configuration: {}", ctx.config_path.display());

    let (dispatcher, ui) = ui_channel(StdoutEditorHost::new(&config.editor));
    let service = Arc::new(ListenerService::new(config.listener, dispatcher.clone()));

    if let Err(e) = service.activate() {
        record_bind_failure(&ctx.config_path, &e);
        if args.no_watch {
            // Nothing could ever start the listener again
            return Err(e.into());
        }
    }

    // Hold the handle for the lifetime of the UI loop; dropping it stops the watcher
    let _watcher_handle = if !args.no_watch {
        let watcher = ConfigWatcher::new(ctx.config_path.clone());
        Some(watch_config(&watcher, Arc::clone(&service))?)
    } else {
        None
    };

    spawn_signal_thread(Arc::clone(&service), dispatcher)?;

    // Blocks until the signal thread shuts the loop down
    ui.run();

    service.stop();
    tracing::info!("steb stopped");
    Ok(String::new())
}

/// Feed configuration file changes to `service`.
///
/// The baseline is read from the file now, after activation, so a startup
/// revert to `enabled = false` is already part of it and the next toggle
/// back to `true` counts as a change.
fn watch_config(watcher: &ConfigWatcher, service: Arc<ListenerService>) -> Result<WatcherHandle> {
    let config_path = watcher.path().to_path_buf();
    let baseline = StebConfig::load_from(&config_path)?;
    let handle = watcher.start(baseline, move |changed| {
        if let Err(e) = service.on_config_changed(&changed.listener) {
            record_bind_failure(&config_path, &e);
        }
    })?;
    tracing::info!("Watching configuration for changes");
    Ok(handle)
}

/// Persist `listener.enabled = false` after a bind failure.
///
/// The service has already logged the failure and reverted its own state.
fn record_bind_failure(config_path: &Path, error: &BindError) {
    tracing::debug!("Disabling listener in {} after: {}", config_path.display(), error);
    if let Err(e) = persist_disabled(config_path) {
        tracing::error!("Failed to record disabled listener: {}", e);
    }
}

fn persist_disabled(config_path: &Path) -> Result<()> {
    let mut config = StebConfig::load_from(config_path)?;
    if config.listener.enabled {
        config.listener.enabled = false;
        config.save_to(config_path)?;
    }
    Ok(())
}

fn spawn_signal_thread(service: Arc<ListenerService>, dispatcher: UiDispatcher) -> Result<()> {
    thread::Builder::new()
        .name("steb-signal".to_string())
        .spawn(move || {
            if let Err(e) = wait_for_ctrl_c() {
                tracing::error!("{:#}", e);
                return;
            }
            tracing::info!("Received Ctrl-C, shutting down");
            service.stop();
            dispatcher.shutdown_loop();
        })?;
    Ok(())
}

fn wait_for_ctrl_c() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime for signal handling")?;
    runtime
        .block_on(tokio::signal::ctrl_c())
        .context("Failed to listen for Ctrl-C")
}
