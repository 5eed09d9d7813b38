use std::cell::RefCell;
use std::fmt;
use std::net::Ipv4Addr;
use std::rc::Rc;

use bytes::{Buf, Bytes, BytesMut};

use crate::net::connection::AsyncConnection;
use crate::reactor::{Callback, Next, Pollable};

/// A frame could not be delimited within the configured limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    TooLarge { buffered: usize, limit: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooLarge { buffered, limit } => {
                write!(f, "frame exceeds {limit} bytes ({buffered} buffered)")
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Adds a read buffer on top of an [`AsyncConnection`] so callers can ask for
/// delimited or fixed-size frames regardless of how the peer's bytes arrive.
///
/// Used through an `Rc` because every pending read keeps the connection, and
/// with it the buffer, alive until it resolves.
pub struct AsyncBufferedConnection {
    inner: Rc<dyn AsyncConnection>,
    buffer: RefCell<BytesMut>,
}

impl AsyncBufferedConnection {
    pub fn new(inner: Rc<dyn AsyncConnection>) -> Rc<Self> {
        Rc::new(Self {
            inner,
            buffer: RefCell::new(BytesMut::new()),
        })
    }

    /// Resolves with every byte before the first `separator`, and drops the
    /// separator from the stream.
    ///
    /// Resolves synchronously when the buffer already holds a separator. If the
    /// peer goes away first, the callback is never called.
    pub fn read_until(self: &Rc<Self>, separator: impl Into<Bytes>, callback: Callback<Result<Bytes, FrameError>>) -> Next {
        FrameRead {
            conn: self.clone(),
            want: Want::Separator(separator.into()),
            callback,
        }
        .scan()
    }

    /// Resolves with exactly `len` bytes.
    pub fn read_exact(self: &Rc<Self>, len: usize, callback: Callback<Result<Bytes, FrameError>>) -> Next {
        FrameRead {
            conn: self.clone(),
            want: Want::Length(len),
            callback,
        }
        .scan()
    }

    pub fn write(&self, payload: Bytes, callback: Callback<()>) -> Box<dyn Pollable> {
        self.inner.write(payload, callback)
    }

    pub fn remote_addr(&self) -> Ipv4Addr {
        self.inner.remote_addr()
    }

    /// Bytes received but not yet handed out.
    pub fn buffered_len(&self) -> usize {
        self.buffer.borrow().len()
    }

    fn limit(&self) -> usize {
        self.inner.config().max_frame_bytes
    }

    fn take(&self, want: &Want) -> Scan {
        let mut buffer = self.buffer.borrow_mut();
        let limit = self.limit();

        match want {
            Want::Separator(separator) => match find(&buffer, separator) {
                Some(pos) => {
                    let frame = buffer.split_to(pos).freeze();
                    buffer.advance(separator.len());
                    Scan::Found(frame)
                }
                None if buffer.len() > limit => Scan::TooLarge(FrameError::TooLarge {
                    buffered: buffer.len(),
                    limit,
                }),
                None => Scan::Missing,
            },
            Want::Length(len) if *len > limit => Scan::TooLarge(FrameError::TooLarge {
                buffered: buffer.len(),
                limit,
            }),
            Want::Length(len) if buffer.len() >= *len => Scan::Found(buffer.split_to(*len).freeze()),
            Want::Length(_) => Scan::Missing,
        }
    }
}

enum Want {
    Separator(Bytes),
    Length(usize),
}

enum Scan {
    Found(Bytes),
    TooLarge(FrameError),
    Missing,
}

/// A frame request in flight.
///
/// Alternates between scanning the buffer and awaiting one more read from the
/// connection until the frame is complete. The buffer lives on the connection,
/// so nothing already received is lost between reads.
struct FrameRead {
    conn: Rc<AsyncBufferedConnection>,
    want: Want,
    callback: Callback<Result<Bytes, FrameError>>,
}

impl FrameRead {
    fn scan(self) -> Next {
        match self.conn.take(&self.want) {
            Scan::Found(frame) => (self.callback)(Ok(frame)),
            Scan::TooLarge(err) => (self.callback)(Err(err)),
            Scan::Missing => self.await_more(),
        }
    }

    fn await_more(self) -> Next {
        let inner = self.conn.inner.clone();
        Some(inner.read(Box::new(move |chunk: Bytes| {
            self.conn.buffer.borrow_mut().extend_from_slice(&chunk);
            self.scan()
        })))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
