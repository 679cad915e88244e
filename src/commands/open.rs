//! Open command handler (the shell client)
//!
//! Turns `steb open [-p|-c] PATH...` into wire lines and writes each one on a
//! fresh connection to the local listener. Nothing is read back; the listener
//! never replies.

use std::io::Write;
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::path::{Path, PathBuf};

use crate::cli::OpenArgs;
use crate::commands::CommandContext;
use crate::error::{Result, StebError};
use crate::fs_utils::absolutize;
use crate::protocol::Request;

/// Run the open command
pub fn run_open(args: &OpenArgs, ctx: &CommandContext) -> Result<String> {
    let port = match args.port {
        Some(port) => port,
        None => ctx.load_config()?.listener.port,
    };
    let cwd = std::env::current_dir()?;
    let requests = build_requests(args, &cwd)?;

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    for request in &requests {
        send_request(addr, request)?;
        tracing::debug!("Sent {} to {}", request.kind(), addr);
    }
    Ok(String::new())
}

/// Build the requests for the given arguments, resolving paths against `cwd`.
pub fn build_requests(args: &OpenArgs, cwd: &Path) -> Result<Vec<Request>> {
    let paths: Vec<PathBuf> = args.paths.iter().map(|p| absolutize(p, cwd)).collect();

    if args.compare {
        let [left, right] = paths.as_slice() else {
            return Err(StebError::Usage {
                message: format!("Compare needs exactly two paths, got {}", paths.len()),
            });
        };
        // The compare line is split on single spaces
        for path in [left, right] {
            if path.to_string_lossy().contains(' ') {
                return Err(StebError::UnsupportedPath {
                    path: path.display().to_string(),
                });
            }
        }
        return Ok(vec![Request::Compare {
            left: left.clone(),
            right: right.clone(),
        }]);
    }

    if args.project {
        let [path] = paths.as_slice() else {
            return Err(StebError::Usage {
                message: format!("A project takes exactly one directory, got {}", paths.len()),
            });
        };
        return Ok(vec![Request::OpenProject { path: path.clone() }]);
    }

    Ok(paths
        .into_iter()
        .map(|path| Request::OpenFile { path })
        .collect())
}

/// Write one request line on its own connection.
pub fn send_request(addr: SocketAddr, request: &Request) -> Result<()> {
    let mut stream = TcpStream::connect(addr).map_err(|e| StebError::IoError {
        path: PathBuf::from(addr.to_string()),
        message: format!("No steb listener reachable ({})", e),
    })?;
    stream.write_all(format!("{}\n", request.to_line()).as_bytes())?;
    stream.flush()?;
    let _ = stream.shutdown(Shutdown::Write);
    Ok(())
}
