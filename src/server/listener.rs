//! Loopback command listener
//!
//! Owns the server socket and the accept thread. Connections are served
//! strictly one at a time, in arrival order, on the accept thread itself.
//!
//! # Phases
//!
//! ```text
//! Stopped ──bind──► Starting ──spawn──► Accepting ──stop──► Draining ──join──► Stopped
//!                      │
//!                      └── bind error ──► Stopped (nothing left running)
//! ```
//!
//! # Shutdown
//!
//! `accept()` on a std listener cannot be cancelled. Stopping clears the
//! running flag and then connects to the listener's own port, writing a
//! single newline. The woken loop sees the flag and exits, closing the
//! socket. `shutdown` joins the thread, so once it returns the port is free.

use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::error::BindError;
use crate::gateway::UiDispatcher;

use super::connection::handle_connection;

/// Bind the listener on `127.0.0.1:port` and start its accept thread.
///
/// Port 0 asks the OS for a free port; see [`ListenerHandle::local_addr`].
pub fn spawn_listener(port: u16, dispatcher: UiDispatcher) -> Result<ListenerHandle, BindError> {
    let bind_error = |source| BindError { port, source };

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).map_err(bind_error)?;
    let addr = listener.local_addr().map_err(bind_error)?;
    let running = Arc::new(AtomicBool::new(true));

    let loop_running = Arc::clone(&running);
    let thread = thread::Builder::new()
        .name(format!("steb-listener-{}", addr.port()))
        .spawn(move || accept_loop(listener, loop_running, dispatcher))
        .map_err(bind_error)?;

    tracing::info!("Listening for shell commands on {}", addr);

    Ok(ListenerHandle {
        addr,
        running,
        thread: Some(thread),
    })
}

fn accept_loop(listener: TcpListener, running: Arc<AtomicBool>, dispatcher: UiDispatcher) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                // Woken for shutdown (or raced with it): exit without reading
                if !running.load(Ordering::SeqCst) {
                    drop(stream);
                    break;
                }
                handle_connection(stream, peer, &dispatcher);
            }
            Err(e) => {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                tracing::error!("Problem in listener: {}", e);
            }
        }
    }

    let addr = listener.local_addr().ok();
    drop(listener);
    tracing::info!("Listener on {:?} closed", addr);
}

/// Handle to a running listener; stopping it (or dropping it) closes the socket
pub struct ListenerHandle {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether the accept thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the accept loop and wait for the thread to exit.
    ///
    /// Blocks for as long as the connection currently being served does;
    /// there is no per-connection timeout.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        if !thread.is_finished() {
            self.send_poison_pill();
        }

        if thread.join().is_err() {
            tracing::error!("Listener thread on {} panicked", self.addr);
        }
    }

    /// Wake the blocked `accept()` so the loop can observe the running flag.
    fn send_poison_pill(&self) {
        let wake = (Ipv4Addr::LOCALHOST, self.addr.port());
        match TcpStream::connect(wake) {
            Ok(mut stream) => {
                let _ = stream.write_all(b"\n");
            }
            Err(e) => tracing::debug!("Wake-up connection to {} failed: {}", self.addr, e),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
