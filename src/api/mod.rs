//! API Module
//!
//! HTTP handlers and routing that expose the cache to out-of-process callers.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value under a key
//! - `GET /get/:key` - Retrieve a live value
//! - `GET /has/:key` - Check for a live value
//! - `DELETE /del/:key` - Invalidate a key
//! - `DELETE /clear` - Drop every entry
//! - `GET /keys` - List stored keys
//! - `POST /sweep` - Remove stale entries now
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
