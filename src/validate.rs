//! Filesystem preconditions checked before a request reaches the editor host
//!
//! Only stat-like queries are performed here; nothing is created or
//! modified. Symlinks are followed.

use std::fs;
use std::path::Path;

use crate::error::ValidationError;
use crate::protocol::Request;

/// A request whose filesystem preconditions held at validation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest(Request);

impl ValidRequest {
    pub fn request(&self) -> &Request {
        &self.0
    }

    pub fn into_request(self) -> Request {
        self.0
    }
}

/// Check a request against the filesystem.
///
/// - `OpenFile`: the path must be a regular file or not exist yet
/// - `OpenProject`: the path must be a directory or not exist yet
/// - `Compare`: both paths must exist
pub fn validate(req: Request) -> Result<ValidRequest, ValidationError> {
    match &req {
        Request::OpenFile { path } => {
            if let Ok(meta) = fs::metadata(path) {
                if !meta.is_file() {
                    return Err(ValidationError::NotAFile(path.clone()));
                }
            }
        }
        Request::OpenProject { path } => {
            if let Ok(meta) = fs::metadata(path) {
                if !meta.is_dir() {
                    return Err(ValidationError::NotADirectory(path.clone()));
                }
            }
        }
        Request::Compare { left, right } => {
            for path in [left, right] {
                if !exists(path) {
                    return Err(ValidationError::MissingCompareInput(path.clone()));
                }
            }
        }
    }
    Ok(ValidRequest(req))
}

fn exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}
