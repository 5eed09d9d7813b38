use std::rc::Rc;

use crate::http::frame::{CRLFCRLF, Frame};
use crate::http::parser::{ParseError, parse_request_frame};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::net::buffered::AsyncBufferedConnection;
use crate::net::connection::AsyncConnection;
use crate::reactor::{Callback, Next, Pollable};

/// Reads requests from and writes responses to one client.
pub struct AsyncHttpConnection {
    conn: Rc<AsyncBufferedConnection>,
}

impl AsyncHttpConnection {
    pub fn new(conn: Rc<dyn AsyncConnection>) -> Rc<Self> {
        Rc::new(Self {
            conn: AsyncBufferedConnection::new(conn),
        })
    }

    /// Reads the next request, including a Content-Length body.
    ///
    /// The callback receives `Err` for a malformed or oversized request; it is
    /// up to the caller to answer it. Requests are stamped with the peer's
    /// address.
    pub fn read_request(&self, callback: Callback<Result<Request, ParseError>>) -> Next {
        let conn = self.conn.clone();

        self.conn.read_until(
            CRLFCRLF,
            Box::new(move |frame| {
                let parsed = frame
                    .map_err(ParseError::from)
                    .and_then(|frame| parse_request_frame(&Frame::new(frame)));

                let mut request = match parsed {
                    Ok(request) => request,
                    Err(err) => return callback(Err(err)),
                };
                request.remote_addr = conn.remote_addr();

                match request.content_length() {
                    None | Some(Ok(0)) => callback(Ok(request)),
                    Some(Err(_)) => callback(Err(ParseError::InvalidContentLength)),
                    Some(Ok(len)) => conn.read_exact(
                        len,
                        Box::new(move |body| match body {
                            Ok(body) => {
                                request.body = body.to_vec();
                                callback(Ok(request))
                            }
                            Err(err) => callback(Err(err.into())),
                        }),
                    ),
                }
            }),
        )
    }

    pub fn write_response(&self, response: &Response, callback: Callback<()>) -> Box<dyn Pollable> {
        self.conn.write(response.pack().serialize(), callback)
    }
}
