//! Line protocol spoken by shell clients
//!
//! A client connects to `127.0.0.1:<port>`, writes exactly one line and
//! closes. Nothing is ever written back.
//!
//! ```text
//! <path>            open a file (created if missing)
//! -p <dir>          open or create a project rooted at <dir>
//! -c <left> <right> open a two-way compare
//! ```
//!
//! Paths are taken verbatim: there is no quoting or escaping, so compare
//! mode cannot carry paths that contain spaces.

use std::path::PathBuf;

use crate::error::ParseError;

/// Flag selecting project mode
pub const PROJECT_FLAG: &str = "-p";

/// Flag selecting compare mode
pub const COMPARE_FLAG: &str = "-c";

/// Upper bound on a single command line, newline included
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Open a single file in an editor
    OpenFile { path: PathBuf },
    /// Open (or create) a project rooted at a directory
    OpenProject { path: PathBuf },
    /// Open a compare view between two existing files
    Compare { left: PathBuf, right: PathBuf },
}

impl Request {
    /// Parse one line of input.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        if let Some(rest) = strip_flag(line, PROJECT_FLAG) {
            return Ok(Request::OpenProject {
                path: PathBuf::from(rest.trim()),
            });
        }

        if strip_flag(line, COMPARE_FLAG).is_some() {
            let tokens: Vec<&str> = line.split(' ').collect();
            return match tokens.as_slice() {
                [_, left, right] if !left.is_empty() && !right.is_empty() => {
                    Ok(Request::Compare {
                        left: PathBuf::from(left),
                        right: PathBuf::from(right),
                    })
                }
                _ => Err(ParseError::MalformedCompare),
            };
        }

        Ok(Request::OpenFile {
            path: PathBuf::from(line),
        })
    }

    /// Parse raw bytes read from the wire, line terminator included or not.
    pub fn parse_bytes(raw: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| ParseError::Malformed("line is not valid UTF-8".to_string()))?;
        Self::parse(text)
    }

    /// Render the request as a wire line (without the trailing newline).
    pub fn to_line(&self) -> String {
        match self {
            Request::OpenFile { path } => path.display().to_string(),
            Request::OpenProject { path } => format!("{} {}", PROJECT_FLAG, path.display()),
            Request::Compare { left, right } => {
                format!("{} {} {}", COMPARE_FLAG, left.display(), right.display())
            }
        }
    }

    /// Short name used in logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            Request::OpenFile { .. } => "open_file",
            Request::OpenProject { .. } => "open_project",
            Request::Compare { .. } => "compare",
        }
    }
}

/// Returns the remainder after `flag ` if the line starts with the flag
/// followed by a space.
fn strip_flag<'a>(line: &'a str, flag: &str) -> Option<&'a str> {
    line.strip_prefix(flag)?.strip_prefix(' ')
}
