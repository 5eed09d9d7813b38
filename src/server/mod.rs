//! The HTTP server: accept loop and per-connection request loop.

pub mod handler;
pub mod listener;

pub use handler::handle_connection;
pub use listener::AsyncHttpServer;
