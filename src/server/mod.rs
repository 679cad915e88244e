//! Loopback command listener
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         ListenerService                              │
//! │            Mutex<{ ListenerConfig, ListenerState }>                  │
//! │                                                                      │
//! │   ConfigWatcher ──on_config_changed──►  start / stop / restart       │
//! │                                              │                       │
//! │                                              ▼                       │
//! │   ┌──────────────────────────────────────────────────────────────┐   │
//! │   │ accept thread (one per Running state)                        │   │
//! │   │   accept ─► loopback check ─► read line ─► parse ─► validate │   │
//! │   │                                              │               │   │
//! │   │                                   UiDispatcher (blocking)    │   │
//! │   └──────────────────────────────────────────────┼───────────────┘   │
//! └──────────────────────────────────────────────────┼───────────────────┘
//!                                                    ▼
//!                                      UI thread ─► EditorHost
//! ```
//!
//! # Locking
//!
//! `ListenerService` holds its lock across stop/start, including the join of
//! the accept thread. The accept thread never takes that lock, so the join
//! cannot deadlock; it only waits for the connection in progress.
//!
//! # Modules
//!
//! - `connection` - One request per connection
//! - `listener` - Socket, accept thread, poison-pill shutdown
//! - `lifecycle` - Start/stop in response to configuration
//! - `events` - JSON event stream editor host used by `steb serve`
//! - `watcher` - Config file watching

pub mod connection;
pub mod events;
pub mod lifecycle;
pub mod listener;
pub mod watcher;

pub use connection::{handle_connection, serve_connection, ConnectionOutcome};
pub use events::{EventEmitter, StdoutEditorHost};
pub use lifecycle::{ConfigChange, ListenerService, ListenerState};
pub use listener::{spawn_listener, ListenerHandle};
pub use watcher::{ConfigWatcher, WatcherConfig, WatcherHandle};
