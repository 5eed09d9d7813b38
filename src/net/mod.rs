//! Non-blocking sockets and the byte-level connections built on them.

pub mod buffered;
pub mod connection;
pub mod listener;
pub mod socket;

pub use buffered::{AsyncBufferedConnection, FrameError};
pub use connection::{AsyncConnection, SocketConnection};
pub use listener::ListenerPollable;
pub use socket::{AutoClosingSocket, ConnectionConfig, SocketReadPollable, SocketWritePollable};
