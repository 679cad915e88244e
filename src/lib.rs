//! steb: shell-to-editor bridge
//!
//! A loopback TCP listener that accepts one-line commands from local shell
//! clients and turns them into editor actions: open a file, open a directory
//! as a project, or open a two-way compare.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use steb::config::ListenerConfig;
//! use steb::gateway::ui_channel;
//! use steb::server::{ListenerService, StdoutEditorHost};
//!
//! let (dispatcher, ui) = ui_channel(StdoutEditorHost::new(&Default::default()));
//! let service = Arc::new(ListenerService::new(
//!     ListenerConfig { port: 4404, enabled: true },
//!     dispatcher,
//! ));
//! service.activate()?;
//!
//! // This thread now serves as the editor's UI thread.
//! ui.run();
//! # Ok::<(), steb::BindError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs_utils;
pub mod gateway;
pub mod protocol;
pub mod server;
pub mod validate;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{ListenerConfig, StebConfig};
pub use error::{BindError, GatewayError, ParseError, Result, StebError, ValidationError};
pub use gateway::{ui_channel, EditorHandle, EditorHost, HostResponse, UiDispatcher, UiLoop};
pub use protocol::Request;
pub use server::{ConfigChange, ListenerService};
pub use validate::{validate, ValidRequest};
