//! Sluice - single-threaded static file server
//!
//! Every connection is a chain of continuations driven by one `poll(2)`
//! reactor. Files are served from a document root, gated by `.htaccess`
//! address rules.

pub mod access;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod http;
pub mod net;
pub mod reactor;
pub mod repository;
pub mod server;
