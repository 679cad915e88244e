//! Error types and exit codes for steb

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Main error type for steb commands and configuration
#[derive(Error, Debug)]
pub enum StebError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error at {path}: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("Invalid port {port}: must be between 1025 and 65534")]
    InvalidPort { port: i64 },

    #[error("{message}")]
    Usage { message: String },

    #[error("Unsupported path {path}: paths in compare mode may not contain spaces")]
    UnsupportedPath { path: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StebError {
    /// Convert error to an exit code:
    /// - 0: Success
    /// - 1: IO error
    /// - 2: Configuration error / invalid value / bad usage
    /// - 3: Listener could not bind
    /// - 4: Request not expressible on the wire
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) | Self::IoError { .. } => ExitCode::from(1),
            Self::ConfigError { .. } | Self::InvalidPort { .. } | Self::Usage { .. } => {
                ExitCode::from(2)
            }
            Self::Bind(_) => ExitCode::from(3),
            Self::UnsupportedPath { .. } => ExitCode::from(4),
        }
    }
}

/// The listener socket could not be bound.
#[derive(Error, Debug)]
#[error("Unable to listen on 127.0.0.1:{port} ({source})")]
pub struct BindError {
    pub port: u16,
    #[source]
    pub source: io::Error,
}

/// A command line could not be turned into a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,

    #[error("compare expects exactly two paths")]
    MalformedCompare,

    #[error("malformed command line: {0}")]
    Malformed(String),
}

/// A parsed request failed its filesystem preconditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} exists and is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("{} exists and is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("compare input {} does not exist", .0.display())]
    MissingCompareInput(PathBuf),
}

/// The editor host failed to carry out a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Host(String),

    #[error("editor UI thread is no longer running")]
    UiThreadGone,
}

impl GatewayError {
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }
}

/// Result type alias for steb operations
pub type Result<T> = std::result::Result<T, StebError>;
