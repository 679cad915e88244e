//! Per-connection handling
//!
//! One accepted stream carries exactly one command line. The connection is
//! closed on every exit path; nothing is ever written back to the client.

use std::io::{self, BufRead, BufReader, Read};
use std::net::{Shutdown, SocketAddr, TcpStream};

use crate::error::{GatewayError, ParseError, ValidationError};
use crate::gateway::{HostResponse, UiDispatcher};
use crate::protocol::{Request, MAX_LINE_BYTES};
use crate::validate::validate;

/// How a connection ended
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// Peer was not a loopback address; nothing was read
    RejectedPeer(SocketAddr),
    /// Empty line or immediate EOF (includes the shutdown wake-up)
    Ignored,
    /// Line could not be parsed
    Dropped(ParseError),
    /// Request failed its filesystem preconditions
    Invalid(ValidationError),
    /// Editor host carried out the request
    Dispatched(HostResponse),
    /// Editor host reported a failure
    GatewayFailed(GatewayError),
    /// Reading the line failed
    ReadFailed(io::Error),
}

/// Handle one accepted stream, then close it.
pub fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    dispatcher: &UiDispatcher,
) -> ConnectionOutcome {
    let outcome = match stream.try_clone() {
        Ok(read_half) => serve_connection(BufReader::new(read_half), peer, dispatcher),
        Err(e) => ConnectionOutcome::ReadFailed(e),
    };
    // Both handles refer to the same socket; shutting it down closes the
    // cloned reader as well.
    let _ = stream.shutdown(Shutdown::Both);
    log_outcome(&peer, &outcome);
    outcome
}

/// Read, parse, validate and dispatch a single command from `reader`.
///
/// The peer address is checked before anything is read.
pub fn serve_connection<R: BufRead>(
    reader: R,
    peer: SocketAddr,
    dispatcher: &UiDispatcher,
) -> ConnectionOutcome {
    if !peer.ip().is_loopback() {
        return ConnectionOutcome::RejectedPeer(peer);
    }

    let line = match read_line(reader) {
        Ok(line) => line,
        Err(e) => return ConnectionOutcome::ReadFailed(e),
    };

    let request = match Request::parse_bytes(&line) {
        Ok(request) => request,
        Err(ParseError::Empty) => return ConnectionOutcome::Ignored,
        Err(e) => return ConnectionOutcome::Dropped(e),
    };

    let valid = match validate(request) {
        Ok(valid) => valid,
        Err(e) => return ConnectionOutcome::Invalid(e),
    };

    tracing::debug!("Dispatching {} from {}", valid.request().kind(), peer);
    match dispatcher.dispatch(valid) {
        Ok(response) => ConnectionOutcome::Dispatched(response),
        Err(e) => ConnectionOutcome::GatewayFailed(e),
    }
}

/// Read up to one newline, bounded by [`MAX_LINE_BYTES`].
///
/// EOF before a newline yields whatever was read. Hitting the bound without
/// a newline yields a line that fails to parse.
fn read_line<R: BufRead>(reader: R) -> io::Result<Vec<u8>> {
    let mut line = Vec::new();
    let limit = MAX_LINE_BYTES as u64;
    let read = reader.take(limit).read_until(b'\n', &mut line)?;
    if read as u64 == limit && line.last() != Some(&b'\n') {
        // Invalid UTF-8 marker so the parser reports it as malformed
        line.clear();
        line.push(0xff);
    }
    Ok(line)
}

fn log_outcome(peer: &SocketAddr, outcome: &ConnectionOutcome) {
    match outcome {
        ConnectionOutcome::RejectedPeer(addr) => {
            tracing::warn!("Ignoring a request from non-local client: {}", addr)
        }
        ConnectionOutcome::Ignored => tracing::trace!("Empty request from {}", peer),
        ConnectionOutcome::Dropped(e) => tracing::debug!("Dropped request from {}: {}", peer, e),
        ConnectionOutcome::Invalid(e) => tracing::info!("Rejected request from {}: {}", peer, e),
        ConnectionOutcome::Dispatched(response) => {
            tracing::info!("Handled request from {}: {:?}", peer, response)
        }
        ConnectionOutcome::GatewayFailed(e) => {
            tracing::warn!("Editor host failed request from {}: {}", peer, e)
        }
        ConnectionOutcome::ReadFailed(e) => {
            tracing::error!("Problem reading request from {}: {}", peer, e)
        }
    }
}
