//! Common test utilities and fixtures for steb integration tests
//!
//! This module provides:
//! - `RecordingHost`, an `EditorHost` that records every call it receives
//! - `Harness`, a `ListenerService` wired to a recording host on its own UI thread
//! - Socket helpers for free ports and one-shot client connections

#![allow(dead_code)]

pub mod harness;

pub use harness::{free_port, send_line, Harness, HostCall, RecordingHost};
