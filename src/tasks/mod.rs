//! Background Tasks Module
//!
//! Periodic work the service runs alongside the HTTP server.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
