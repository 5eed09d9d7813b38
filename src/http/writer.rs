use bytes::{BufMut, BytesMut};

use crate::http::frame::{CRLF, Frame};
use crate::http::request::{Header, Request};
use crate::http::response::Response;

fn put_headers(buf: &mut BytesMut, headers: &[Header]) {
    for header in headers {
        buf.put_slice(header.key.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(header.value.as_bytes());
        buf.put_slice(CRLF);
    }

    // Header/body separator
    buf.put_slice(CRLF);
}

/// Packs a response into the bytes sent on the wire.
pub fn serialize_response(resp: &Response) -> Frame {
    let mut buf = BytesMut::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.put_slice(status_line.as_bytes());

    put_headers(&mut buf, &resp.headers);
    buf.put_slice(&resp.body);

    Frame::new(buf.freeze())
}

/// Packs a request the way a client would send it.
pub fn serialize_request(req: &Request) -> Frame {
    let mut buf = BytesMut::with_capacity(128 + req.body.len());

    let request_line = format!("{} {} {}\r\n", req.method, req.uri, req.version);
    buf.put_slice(request_line.as_bytes());

    put_headers(&mut buf, &req.headers);
    buf.put_slice(&req.body);

    Frame::new(buf.freeze())
}

impl Response {
    pub fn pack(&self) -> Frame {
        serialize_response(self)
    }
}

impl Request {
    pub fn pack(&self) -> Frame {
        serialize_request(self)
    }
}
