use bytes::Bytes;

pub const CRLF: &[u8] = b"\r\n";
pub const CRLFCRLF: &[u8] = b"\r\n\r\n";

/// Raw bytes of one HTTP message, either as read from a connection (initial
/// line and headers, without the blank line) or as packed for sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    contents: Bytes,
}

impl Frame {
    pub fn new(contents: impl Into<Bytes>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.contents
    }

    pub fn serialize(self) -> Bytes {
        self.contents
    }
}
