use std::io;
use std::net::TcpListener;
use std::os::unix::io::{AsRawFd, RawFd};
use std::rc::Rc;
use std::time::Instant;

use nix::poll::PollFlags;

use crate::net::connection::SocketConnection;
use crate::net::socket::ConnectionConfig;
use crate::reactor::{Next, PollError, Pollable};

/// Accepts one connection per readiness event and hands it to `on_accept`.
///
/// Never done and never past its deadline, so it stays registered for the
/// lifetime of the reactor.
pub struct ListenerPollable {
    listener: Rc<TcpListener>,
    config: ConnectionConfig,
    on_accept: Box<dyn Fn(SocketConnection) -> Next>,
}

impl ListenerPollable {
    pub fn new(
        listener: Rc<TcpListener>,
        config: ConnectionConfig,
        on_accept: Box<dyn Fn(SocketConnection) -> Next>,
    ) -> Self {
        Self {
            listener,
            config,
            on_accept,
        }
    }
}

impl Pollable for ListenerPollable {
    fn descriptor(&self) -> RawFd {
        self.listener.as_raw_fd()
    }

    fn interest(&self) -> PollFlags {
        PollFlags::POLLIN
    }

    fn is_done(&self) -> bool {
        false
    }

    fn past_deadline(&self, _now: Instant) -> bool {
        false
    }

    fn resume(&mut self, _ready: PollFlags) -> Result<Next, PollError> {
        let (stream, peer) = match self.listener.accept() {
            Ok(accepted) => accepted,
            Err(err) if is_transient(&err) => {
                tracing::debug!(error = %err, "accept() would block or was interrupted");
                return Ok(None);
            }
            Err(err) => return Err(PollError::Listener(err)),
        };

        match SocketConnection::new(stream, peer, self.config) {
            Ok(conn) => {
                tracing::info!(peer = %peer, fd = conn.descriptor(), "Accepted connection");
                Ok((self.on_accept)(conn))
            }
            Err(err) => {
                tracing::warn!(peer = %peer, error = %err, "Unable to make client socket non-blocking");
                Ok(None)
            }
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted
    )
}
