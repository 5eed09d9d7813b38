//! HTTP protocol implementation.
//!
//! This module frames the bytes of a buffered connection into HTTP/0.9–1.1
//! requests and packs responses back into bytes, without ever blocking the
//! reactor thread.
//!
//! # Architecture
//!
//! - **`connection`**: Reads requests and writes responses as continuations
//! - **`parser`**: Parses the initial line and headers of a request
//! - **`writer`**: Serializes requests and responses into frames
//! - **`frame`**: Raw bytes of one message
//! - **`request`** / **`response`**: Message types
//! - **`path`**: Canonical file paths derived from request targets
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection loop
//!
//! Each client connection cycles through continuations:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← read_until(CRLFCRLF), then the body if any
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Handling       │ ← filter + handler, may wait on more pollables
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← one write pollable
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → socket dropped
//! ```

pub mod connection;
pub mod frame;
pub mod mime;
pub mod parser;
pub mod path;
pub mod request;
pub mod response;
pub mod writer;
