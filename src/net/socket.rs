use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::unix::io::{AsRawFd, RawFd};
use std::rc::Rc;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use nix::poll::PollFlags;

use crate::reactor::{Attempt, Callback, Next, PollError, Pollable};

/// Tuning shared by every pollable of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// How long a single read or write may wait for readiness.
    pub io_timeout: Duration,
    /// Largest single `recv`.
    pub read_chunk: usize,
    /// Largest single `send`.
    pub write_chunk: usize,
    /// Cap on bytes buffered while looking for a frame separator.
    pub max_frame_bytes: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            io_timeout: Duration::from_secs(5),
            read_chunk: 8192,
            write_chunk: 64 * 1024,
            max_frame_bytes: 64 * 1024,
        }
    }
}

/// Owns a non-blocking client socket. Shut down and closed when dropped, so
/// wrapping it in an `Rc` closes it after the last pending operation is gone.
#[derive(Debug)]
pub struct AutoClosingSocket {
    stream: TcpStream,
}

impl AutoClosingSocket {
    pub fn new(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self { stream })
    }

    /// One non-blocking `recv` of at most `max` bytes.
    pub fn try_read(&self, max: usize) -> Attempt<Bytes> {
        let mut buf = BytesMut::zeroed(max.max(1));
        match Attempt::from_io((&self.stream).read(&mut buf)) {
            Attempt::Ready(0) => Attempt::Closed,
            Attempt::Ready(read) => {
                buf.truncate(read);
                Attempt::Ready(buf.freeze())
            }
            Attempt::WouldBlock => Attempt::WouldBlock,
            Attempt::Closed => Attempt::Closed,
            Attempt::Failed(err) => Attempt::Failed(err),
        }
    }

    /// One non-blocking `send`.
    pub fn try_write(&self, buf: &[u8]) -> Attempt<usize> {
        match Attempt::from_io((&self.stream).write(buf)) {
            Attempt::Ready(0) if !buf.is_empty() => Attempt::Closed,
            other => other,
        }
    }
}

impl AsRawFd for AutoClosingSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

impl Drop for AutoClosingSocket {
    fn drop(&mut self) {
        let fd = self.stream.as_raw_fd();
        // The peer may already be gone.
        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            if err.kind() != std::io::ErrorKind::NotConnected {
                tracing::warn!(fd, error = %err, "shutdown() failed");
            }
        }
        tracing::debug!(fd, "Closing socket");
    }
}

/// Waits for the socket to become readable, then reads once.
pub struct SocketReadPollable {
    socket: Rc<AutoClosingSocket>,
    config: ConnectionConfig,
    created: Instant,
    callback: Option<Callback<Bytes>>,
}

impl SocketReadPollable {
    pub fn new(socket: Rc<AutoClosingSocket>, config: ConnectionConfig, callback: Callback<Bytes>) -> Self {
        Self {
            socket,
            config,
            created: Instant::now(),
            callback: Some(callback),
        }
    }
}

impl Pollable for SocketReadPollable {
    fn descriptor(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    fn interest(&self) -> PollFlags {
        PollFlags::POLLIN
    }

    fn is_done(&self) -> bool {
        self.callback.is_none()
    }

    fn past_deadline(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) >= self.config.io_timeout
    }

    fn resume(&mut self, _ready: PollFlags) -> Result<Next, PollError> {
        match self.socket.try_read(self.config.read_chunk) {
            Attempt::Ready(chunk) => {
                tracing::trace!(fd = self.descriptor(), bytes = chunk.len(), "Read");
                match self.callback.take() {
                    Some(callback) => Ok(callback(chunk)),
                    None => Ok(None),
                }
            }
            Attempt::WouldBlock => Ok(None),
            Attempt::Closed => Err(PollError::Closed),
            Attempt::Failed(err) => Err(PollError::Io(err)),
        }
    }
}

/// Waits for the socket to become writable, then drains as much of the
/// payload as the kernel accepts. Resumes from the same offset on re-entry.
pub struct SocketWritePollable {
    socket: Rc<AutoClosingSocket>,
    config: ConnectionConfig,
    created: Instant,
    payload: Bytes,
    sent: usize,
    callback: Option<Callback<()>>,
}

impl SocketWritePollable {
    pub fn new(
        socket: Rc<AutoClosingSocket>,
        config: ConnectionConfig,
        payload: Bytes,
        callback: Callback<()>,
    ) -> Self {
        Self {
            socket,
            config,
            created: Instant::now(),
            payload,
            sent: 0,
            callback: Some(callback),
        }
    }

    /// Returns true once the whole payload is out.
    fn drain(&mut self) -> Result<bool, PollError> {
        while self.sent < self.payload.len() {
            let end = self.payload.len().min(self.sent + self.config.write_chunk.max(1));
            let attempted = end - self.sent;

            match self.socket.try_write(&self.payload[self.sent..end]) {
                Attempt::Ready(written) => {
                    self.sent += written;
                    if written < attempted {
                        return Ok(false);
                    }
                }
                Attempt::WouldBlock => return Ok(false),
                Attempt::Closed => return Err(PollError::Closed),
                Attempt::Failed(err) => return Err(PollError::Io(err)),
            }
        }
        Ok(true)
    }
}

impl Pollable for SocketWritePollable {
    fn descriptor(&self) -> RawFd {
        self.socket.as_raw_fd()
    }

    fn interest(&self) -> PollFlags {
        PollFlags::POLLOUT
    }

    fn is_done(&self) -> bool {
        self.callback.is_none()
    }

    fn past_deadline(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) >= self.config.io_timeout
    }

    fn resume(&mut self, _ready: PollFlags) -> Result<Next, PollError> {
        if !self.drain()? {
            return Ok(None);
        }
        tracing::trace!(fd = self.descriptor(), bytes = self.sent, "Wrote");
        match self.callback.take() {
            Some(callback) => Ok(callback(())),
            None => Ok(None),
        }
    }
}
