//! `geecache` binary internals, exposed for integration tests.

pub mod args;
pub mod commands;
pub mod logging;
pub mod server;
