//! Listener lifecycle tests
