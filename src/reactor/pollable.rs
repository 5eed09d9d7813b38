use std::fmt;
use std::io;
use std::os::unix::io::RawFd;
use std::time::Instant;

use nix::poll::PollFlags;

/// What a completed step hands back to the reactor: the next pending
/// operation, if the chain has one.
pub type Next = Option<Box<dyn Pollable>>;

/// A unit of work to run once its input is available.
///
/// The continuation may schedule more work by returning a pollable. Being
/// `FnOnce`, it is consumed by the single call that completes its operation.
pub type Callback<T> = Box<dyn FnOnce(T) -> Next>;

/// Builds a callback that ends the chain.
pub fn finish<T: 'static>() -> Callback<T> {
    Box::new(|_| None)
}

/// A pending non-blocking operation the reactor can wait on with `poll(2)`.
///
/// Implementations usually carry a [`Callback`] that receives their result.
pub trait Pollable {
    /// Descriptor handed to `poll(2)`.
    fn descriptor(&self) -> RawFd;

    /// Events `poll(2)` should wait for (`POLLIN`, `POLLOUT`).
    fn interest(&self) -> PollFlags;

    /// True once the operation completed and must leave the live set.
    fn is_done(&self) -> bool;

    /// True once the operation waited too long and should be dropped.
    fn past_deadline(&self, now: Instant) -> bool;

    /// Called when `poll(2)` reported one of the interesting events.
    ///
    /// Performs at most one non-blocking attempt. Returning `Ok(None)` while
    /// [`is_done`](Pollable::is_done) is false keeps the operation registered.
    /// Returning an error abandons it without running its continuation.
    fn resume(&mut self, ready: PollFlags) -> Result<Next, PollError>;
}

/// Outcome of a single non-blocking syscall attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Ready(T),
    WouldBlock,
    Closed,
    Failed(io::Error),
}

impl<T> Attempt<T> {
    pub fn from_io(result: io::Result<T>) -> Self {
        match result {
            Ok(value) => Attempt::Ready(value),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Attempt::WouldBlock,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Attempt::WouldBlock,
            Err(err) => Attempt::Failed(err),
        }
    }
}

/// Why a pollable was abandoned.
#[derive(Debug)]
pub enum PollError {
    /// The peer closed the connection.
    Closed,
    /// A socket operation failed.
    Io(io::Error),
    /// The listening socket failed. This one stops the reactor.
    Listener(io::Error),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Closed => write!(f, "connection closed by peer"),
            PollError::Io(err) => write!(f, "socket error: {err}"),
            PollError::Listener(err) => write!(f, "listener error: {err}"),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Closed => None,
            PollError::Io(err) | PollError::Listener(err) => Some(err),
        }
    }
}

impl From<io::Error> for PollError {
    fn from(err: io::Error) -> Self {
        PollError::Io(err)
    }
}
