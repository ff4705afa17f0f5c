//! HTTP server module.
//!
//! The server includes:
//! - Static file serving from the public directory
//! - Bind error classification (occupied port vs. other failures)
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;
pub mod static_files;

pub use server::{bind_listener, start_server, ServerError};
