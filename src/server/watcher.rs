//! Configuration file watcher
//!
//! Watches `config.toml` and hands every changed, valid configuration to a
//! callback. This is how preference edits (from `steb config set`,
//! `steb toggle`, or a text editor) reach the running listener.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────────────┐
//! │   notify    │────>│  debouncer  │────>│ reload + on_change(cfg)  │
//! │  (parent)   │     │  (200ms)    │     │ (ListenerService update) │
//! └─────────────┘     └─────────────┘     └──────────────────────────┘
//! ```
//!
//! The parent directory is watched rather than the file itself because saves
//! replace the file through a rename.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use crate::config::StebConfig;
use crate::error::{Result, StebError};

/// Configuration for the config watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce duration (default: 200ms)
    pub debounce_duration: Duration,
    /// How often the worker checks its running flag
    pub poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(200),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Watches a configuration file for changes
pub struct ConfigWatcher {
    /// Path of the watched config file
    path: PathBuf,
    /// Watcher configuration
    config: WatcherConfig,
    /// Whether the watcher is running
    running: Arc<AtomicBool>,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Self {
        Self::with_config(path, WatcherConfig::default())
    }

    pub fn with_config(path: PathBuf, config: WatcherConfig) -> Self {
        Self {
            path,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Path of the watched config file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the watcher is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start watching.
    ///
    /// `initial` is the configuration already in effect; `on_change` is only
    /// called for configurations that differ from the last one seen. Files
    /// that fail to parse are logged and skipped.
    pub fn start<F>(&self, initial: StebConfig, mut on_change: F) -> Result<WatcherHandle>
    where
        F: FnMut(StebConfig) + Send + 'static,
    {
        if self.running.swap(true, Ordering::SeqCst) {
            // Already running
            return Ok(WatcherHandle {
                running: Arc::clone(&self.running),
            });
        }

        let dir = watch_dir(&self.path);
        std::fs::create_dir_all(&dir).map_err(|e| StebError::IoError {
            path: dir.clone(),
            message: e.to_string(),
        })?;

        let (tx, rx) = std::sync::mpsc::channel();
        let watch_error = |e: notify::Error| StebError::ConfigError {
            message: format!("Failed to watch {}: {}", dir.display(), e),
        };

        let started = new_debouncer(self.config.debounce_duration, tx)
            .map_err(watch_error)
            .and_then(|mut debouncer| {
                debouncer
                    .watcher()
                    .watch(&dir, RecursiveMode::NonRecursive)
                    .map_err(watch_error)?;
                Ok(debouncer)
            });
        let debouncer = match started {
            Ok(debouncer) => debouncer,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let path = self.path.clone();
        let poll_interval = self.config.poll_interval;
        let running = Arc::clone(&self.running);
        std::thread::Builder::new()
            .name("steb-config-watcher".to_string())
            .spawn(move || {
                // Keep the OS watcher alive for the lifetime of the thread
                let _debouncer = debouncer;
                let mut last = initial;

                while running.load(Ordering::SeqCst) {
                    match rx.recv_timeout(poll_interval) {
                        Ok(Ok(events)) => {
                            if !events.iter().any(|event| is_config_event(&event.path, &path)) {
                                continue;
                            }
                            match StebConfig::load_from(&path) {
                                Ok(config) if config != last => {
                                    tracing::info!("Configuration changed: {}", path.display());
                                    last = config.clone();
                                    on_change(config);
                                }
                                Ok(_) => tracing::trace!("Configuration unchanged"),
                                Err(e) => {
                                    tracing::warn!("Ignoring invalid configuration: {}", e)
                                }
                            }
                        }
                        Ok(Err(e)) => tracing::error!("Config watch error: {:?}", e),
                        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Config watcher stopped");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                StebError::Io(e)
            })?;

        Ok(WatcherHandle {
            running: Arc::clone(&self.running),
        })
    }

    /// Stop watching
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Events carry absolute, possibly canonicalized paths; compare file names
/// within the watched (non-recursive) directory.
fn is_config_event(event_path: &Path, config_path: &Path) -> bool {
    event_path == config_path || event_path.file_name() == config_path.file_name()
}

/// Handle for controlling a running watcher
pub struct WatcherHandle {
    running: Arc<AtomicBool>,
}

impl WatcherHandle {
    /// Stop the watcher
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the watcher is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
