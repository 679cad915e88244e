//! Editor host gateway
//!
//! The listener never talks to the editor directly. Every validated request
//! is marshaled onto the host's single designated thread (the "UI thread")
//! and executed there; the submitting thread blocks until the host reports
//! success or failure.
//!
//! ```text
//! accept thread ──► UiDispatcher ──mpsc──► UiLoop (UI thread) ──► EditorHost
//!        ▲                                        │
//!        └──────────────── oneshot reply ◄────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::config::normalize_extension;
use crate::error::GatewayError;
use crate::protocol::Request;
use crate::validate::ValidRequest;

/// Editor id used when no association exists or the associated editor is overridden
pub const DEFAULT_TEXT_EDITOR: &str = "text";

/// Editor opened for a file request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorHandle {
    pub path: PathBuf,
    pub editor_id: String,
}

/// Operations the embedding editor must provide.
///
/// Implementations run on the UI thread only, so they may hold
/// thread-affine state.
pub trait EditorHost {
    /// Open `path` in an editor, creating an empty file first when `create`
    /// is set and the file does not exist.
    fn open_file(&mut self, path: &Path, create: bool) -> Result<EditorHandle, GatewayError>;

    /// Open `path` as a project, creating the project when `create` is set.
    fn open_project(&mut self, path: &Path, create: bool) -> Result<(), GatewayError>;

    /// Open a two-way compare between `left` and `right`.
    fn open_compare(&mut self, left: &Path, right: &Path) -> Result<(), GatewayError>;
}

/// What the host did with a dispatched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResponse {
    Editor(EditorHandle),
    Project,
    Compare,
}

type Job = Box<dyn FnOnce(&mut dyn EditorHost) + Send>;

enum UiMessage {
    Run(Job),
    Shutdown,
}

/// Create a dispatcher/loop pair bound to `host`.
///
/// The loop must be run on the thread that owns the editor; dispatchers can
/// be cloned freely and handed to other threads.
pub fn ui_channel<H: EditorHost>(host: H) -> (UiDispatcher, UiLoop<H>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, UiLoop { host, rx })
}

/// Submits work to the UI thread and waits for it to finish
#[derive(Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiMessage>,
}

impl UiDispatcher {
    /// Run `f` on the UI thread and block until it returns.
    ///
    /// Must not be called from the UI thread itself.
    pub fn call<T, F>(&self, f: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn EditorHost) -> Result<T, GatewayError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |host| {
            let _ = reply_tx.send(f(host));
        });
        self.tx
            .send(UiMessage::Run(job))
            .map_err(|_| GatewayError::UiThreadGone)?;
        reply_rx
            .blocking_recv()
            .map_err(|_| GatewayError::UiThreadGone)?
    }

    /// Carry out a validated request on the UI thread.
    ///
    /// Files and projects are always opened with creation enabled.
    pub fn dispatch(&self, req: ValidRequest) -> Result<HostResponse, GatewayError> {
        self.call(move |host| match req.into_request() {
            Request::OpenFile { path } => host.open_file(&path, true).map(HostResponse::Editor),
            Request::OpenProject { path } => {
                host.open_project(&path, true).map(|_| HostResponse::Project)
            }
            Request::Compare { left, right } => {
                host.open_compare(&left, &right).map(|_| HostResponse::Compare)
            }
        })
    }

    /// Ask the UI loop to return once queued work has run.
    pub fn shutdown_loop(&self) {
        let _ = self.tx.send(UiMessage::Shutdown);
    }

    /// Whether the UI loop is still accepting work
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Consumer side of the UI queue, owning the editor host
pub struct UiLoop<H> {
    host: H,
    rx: mpsc::UnboundedReceiver<UiMessage>,
}

impl<H: EditorHost> UiLoop<H> {
    /// Process jobs on the current thread until every dispatcher is dropped
    /// or `shutdown_loop` is called. Returns the host.
    pub fn run(mut self) -> H {
        tracing::debug!("UI loop running on {:?}", thread::current().name());
        while let Some(message) = self.rx.blocking_recv() {
            match message {
                UiMessage::Run(job) => job(&mut self.host),
                UiMessage::Shutdown => break,
            }
        }
        tracing::debug!("UI loop finished");
        self.host
    }
}

impl<H: EditorHost + Send + 'static> UiLoop<H> {
    /// Run the loop on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<H>> {
        thread::Builder::new()
            .name("steb-ui".to_string())
            .spawn(move || self.run())
    }
}

/// Editor selection from `editor.associations` and `editor.overrides`
#[derive(Debug, Clone, Default)]
pub struct EditorResolver {
    associations: BTreeMap<String, String>,
    overrides: BTreeSet<String>,
}

impl EditorResolver {
    pub fn new(
        associations: BTreeMap<String, String>,
        overrides: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            associations: associations
                .into_iter()
                .map(|(ext, id)| (normalize_extension(&ext), id))
                .collect(),
            overrides: overrides.into_iter().collect(),
        }
    }

    /// Whether the user asked for `editor_id` to be replaced by the default editor
    pub fn is_overridden(&self, editor_id: &str) -> bool {
        self.overrides.contains(editor_id)
    }

    /// Editor id for `path`, falling back to [`DEFAULT_TEXT_EDITOR`]
    pub fn editor_for(&self, path: &Path) -> String {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.associations.get(&normalize_extension(ext)))
            .filter(|id| !self.is_overridden(id))
            .cloned()
            .unwrap_or_else(|| DEFAULT_TEXT_EDITOR.to_string())
    }
}
