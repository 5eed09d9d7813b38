use std::fmt;
use std::net::Ipv4Addr;

use crate::http::frame::Frame;
use crate::http::request::{Header, Method, Request};
use crate::net::buffered::FrameError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Initial line is not `METHOD SP URI SP VERSION`, or not UTF-8.
    InvalidRequest,
    InvalidMethod,
    /// Request target does not start with `/`.
    InvalidUri,
    /// Header line without `": "`.
    InvalidHeader,
    InvalidContentLength,
    /// Header block or body larger than the connection allows.
    TooLarge,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidRequest => "malformed request line",
            ParseError::InvalidMethod => "invalid request method",
            ParseError::InvalidUri => "request uri must start with '/'",
            ParseError::InvalidHeader => "malformed header line",
            ParseError::InvalidContentLength => "invalid Content-Length",
            ParseError::TooLarge => "request too large",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

impl From<FrameError> for ParseError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::TooLarge { .. } => ParseError::TooLarge,
        }
    }
}

const NUM_REQUEST_PARTS: usize = 3;

/// Parses the initial line and headers of a request.
///
/// `frame` holds everything before the blank line that ends the header
/// block. The body is not part of the frame and is left empty.
pub fn parse_request_frame(frame: &Frame) -> Result<Request, ParseError> {
    let text = std::str::from_utf8(frame.as_bytes()).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = text.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let parts: Vec<&str> = request_line.splitn(NUM_REQUEST_PARTS, ' ').collect();
    if parts.len() != NUM_REQUEST_PARTS {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::parse(parts[0]).ok_or(ParseError::InvalidMethod)?;
    let uri = parts[1];
    let version = parts[2];

    if !uri.starts_with('/') {
        return Err(ParseError::InvalidUri);
    }

    // Headers
    let headers = lines
        .map(|line| {
            line.split_once(": ")
                .map(|(key, value)| Header::new(key, value))
                .ok_or(ParseError::InvalidHeader)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Request {
        method,
        uri: uri.to_string(),
        version: version.to_string(),
        headers,
        body: Vec::new(),
        remote_addr: Ipv4Addr::UNSPECIFIED,
    })
}
