//! Wire scenario tests
//!
//! Each test sends raw command lines to a running listener and checks which
//! editor calls, if any, they produce.

pub mod scenarios;
