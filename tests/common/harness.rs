//! Listener harness backed by a recording editor host

use std::io::{Read, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use steb::config::ListenerConfig;
use steb::gateway::{ui_channel, EditorHandle, EditorHost, UiDispatcher};
use steb::server::ListenerService;
use steb::GatewayError;

/// One call received by the editor host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    OpenFile { path: PathBuf, create: bool },
    OpenProject { path: PathBuf, create: bool },
    Compare { left: PathBuf, right: PathBuf },
}

/// Editor host that only records what it was asked to do
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl EditorHost for RecordingHost {
    fn open_file(&mut self, path: &Path, create: bool) -> Result<EditorHandle, GatewayError> {
        self.calls.lock().unwrap().push(HostCall::OpenFile {
            path: path.to_path_buf(),
            create,
        });
        Ok(EditorHandle {
            path: path.to_path_buf(),
            editor_id: "text".to_string(),
        })
    }

    fn open_project(&mut self, path: &Path, create: bool) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(HostCall::OpenProject {
            path: path.to_path_buf(),
            create,
        });
        Ok(())
    }

    fn open_compare(&mut self, left: &Path, right: &Path) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(HostCall::Compare {
            left: left.to_path_buf(),
            right: right.to_path_buf(),
        });
        Ok(())
    }
}

/// A listener service with its UI loop running on a background thread
pub struct Harness {
    pub service: ListenerService,
    host: RecordingHost,
    dispatcher: UiDispatcher,
    ui: Option<JoinHandle<RecordingHost>>,
}

impl Harness {
    /// Build a stopped service for `port`
    pub fn new(port: u16, enabled: bool) -> Self {
        let host = RecordingHost::default();
        let (dispatcher, ui) = ui_channel(host.clone());
        let ui = ui.spawn().expect("Failed to spawn UI thread");
        let service = ListenerService::new(ListenerConfig { port, enabled }, dispatcher.clone());
        Self {
            service,
            host,
            dispatcher,
            ui: Some(ui),
        }
    }

    /// Build a service on a free port and start it
    pub fn running() -> Self {
        let harness = Self::new(free_port(), true);
        harness.service.activate().expect("Failed to start listener");
        harness
    }

    pub fn addr(&self) -> SocketAddr {
        self.service
            .local_addr()
            .expect("Listener should be running")
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.host.calls()
    }

    /// Wait until at least `count` calls were recorded (for clients that do
    /// not wait for the server to close the connection)
    pub fn wait_for_calls(&self, count: usize, timeout: Duration) -> Vec<HostCall> {
        let deadline = Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if calls.len() >= count || Instant::now() >= deadline {
                return calls;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.service.stop();
        self.dispatcher.shutdown_loop();
        if let Some(ui) = self.ui.take() {
            let _ = ui.join();
        }
    }
}

/// A loopback port nobody is listening on right now
pub fn free_port() -> u16 {
    let listener =
        TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind ephemeral port");
    listener.local_addr().unwrap().port()
}

/// Send one line and wait for the server to close the connection.
///
/// The listener dispatches before closing, so once this returns the host has
/// seen the request (or the request was dropped).
pub fn send_line(addr: SocketAddr, line: &str) {
    let mut stream = TcpStream::connect(addr).expect("Failed to connect to listener");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    stream.write_all(line.as_bytes()).unwrap();
    let _ = stream.shutdown(Shutdown::Write);
    let mut reply = Vec::new();
    let _ = stream.read_to_end(&mut reply);
    assert!(reply.is_empty(), "listener should never reply");
}
