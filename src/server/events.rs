//! Built-in editor host that reports actions as JSON events
//!
//! When steb runs standalone there is no editor in-process. `StdoutEditorHost`
//! performs the filesystem part of each action itself (creating a missing
//! file) and emits one JSON object per line for the embedding editor to act
//! on:
//!
//! ```json
//! {"type":"open_file","path":"/tmp/foo.txt","editor":"text","created":true,"timestamp":"..."}
//! {"type":"open_project","name":"work","path":"/home/me/work","created":false,"timestamp":"..."}
//! {"type":"open_compare","left":"/tmp/a.txt","right":"/tmp/b.txt","timestamp":"..."}
//! ```

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::EditorConfig;
use crate::error::GatewayError;
use crate::gateway::{EditorHandle, EditorHost, EditorResolver};

/// Event emitter writing JSON lines to a sink (stdout by default)
pub struct EventEmitter {
    sink: Box<dyn Write + Send>,
}

impl EventEmitter {
    /// Emitter writing to stdout
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self { sink }
    }

    /// Emit an event as one JSON line
    pub fn emit<E: EditorEvent>(&mut self, event: &E) -> io::Result<()> {
        let wrapper = EventWrapper {
            event_type: E::event_type(),
            payload: event,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string(&wrapper)?;
        writeln!(self.sink, "{}", json)?;
        self.sink.flush()
    }
}

/// Wrapper for events with type and timestamp fields
#[derive(Serialize)]
struct EventWrapper<'a, P: Serialize> {
    #[serde(rename = "type")]
    event_type: &'static str,
    #[serde(flatten)]
    payload: &'a P,
    timestamp: String,
}

/// Trait for editor events
pub trait EditorEvent: Serialize {
    fn event_type() -> &'static str;
}

// ============================================================================
// Event Types
// ============================================================================

/// A file should be opened in an editor
#[derive(Debug, Clone, Serialize)]
pub struct OpenFileEvent {
    pub path: PathBuf,
    /// Editor id resolved from associations and overrides
    pub editor: String,
    /// Whether the file was created for this request
    pub created: bool,
}

impl EditorEvent for OpenFileEvent {
    fn event_type() -> &'static str {
        "open_file"
    }
}

/// A directory should be opened as a project
#[derive(Debug, Clone, Serialize)]
pub struct OpenProjectEvent {
    /// Project name (final path component)
    pub name: String,
    pub path: PathBuf,
    /// Whether the directory was created for this request
    pub created: bool,
}

impl EditorEvent for OpenProjectEvent {
    fn event_type() -> &'static str {
        "open_project"
    }
}

/// Two files should be shown side by side
#[derive(Debug, Clone, Serialize)]
pub struct OpenCompareEvent {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl EditorEvent for OpenCompareEvent {
    fn event_type() -> &'static str {
        "open_compare"
    }
}

// ============================================================================
// Host
// ============================================================================

/// Editor host used by `steb serve`
pub struct StdoutEditorHost {
    resolver: EditorResolver,
    emitter: EventEmitter,
}

impl StdoutEditorHost {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_emitter(config, EventEmitter::stdout())
    }

    pub fn with_emitter(config: &EditorConfig, emitter: EventEmitter) -> Self {
        Self {
            resolver: EditorResolver::new(
                config.associations.clone(),
                config.overrides.iter().cloned(),
            ),
            emitter,
        }
    }

    fn emit<E: EditorEvent>(&mut self, event: &E) -> Result<(), GatewayError> {
        self.emitter
            .emit(event)
            .map_err(|e| GatewayError::host(format!("Failed to emit {}: {}", E::event_type(), e)))
    }
}

impl EditorHost for StdoutEditorHost {
    fn open_file(&mut self, path: &Path, create: bool) -> Result<EditorHandle, GatewayError> {
        let mut created = false;
        if create && !path.exists() {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| {
                    GatewayError::host(format!(
                        "Failed to open editor for file: {} ({})",
                        path.display(),
                        e
                    ))
                })?;
            created = true;
        }
        if !path.is_file() {
            return Err(GatewayError::host(format!(
                "Failed to open editor for file: {}",
                path.display()
            )));
        }

        let editor = self.resolver.editor_for(path);
        self.emit(&OpenFileEvent {
            path: path.to_path_buf(),
            editor: editor.clone(),
            created,
        })?;
        Ok(EditorHandle {
            path: path.to_path_buf(),
            editor_id: editor,
        })
    }

    fn open_project(&mut self, path: &Path, create: bool) -> Result<(), GatewayError> {
        let mut created = false;
        if create && !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| {
                GatewayError::host(format!(
                    "Failed to create project {}: {}",
                    path.display(),
                    e
                ))
            })?;
            created = true;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                GatewayError::host(format!("Project path {} has no name", path.display()))
            })?;

        self.emit(&OpenProjectEvent {
            name,
            path: path.to_path_buf(),
            created,
        })
    }

    fn open_compare(&mut self, left: &Path, right: &Path) -> Result<(), GatewayError> {
        self.emit(&OpenCompareEvent {
            left: left.to_path_buf(),
            right: right.to_path_buf(),
        })
    }
}
