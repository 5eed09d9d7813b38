use std::rc::Rc;

use crate::handlers::AsyncRequestHandler;
use crate::http::connection::AsyncHttpConnection;
use crate::http::request::Request;
use crate::http::response::{HTTP_VERSION_1_1, Response};
use crate::reactor::{Callback, Next, finish};

/// Serves requests on one connection until it closes or misbehaves.
///
/// Each request is read, handed to `handler`, and its response written. The
/// loop then starts over unless the client asked for `Connection: close`. A
/// malformed request gets a 400 and ends the loop.
pub fn handle_connection(conn: Rc<AsyncHttpConnection>, handler: Rc<dyn AsyncRequestHandler>) -> Next {
    let reader = conn.clone();

    reader.read_request(Box::new(move |request| {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(error = %err, "Rejecting malformed request");
                return Some(conn.write_response(&Response::bad_request(), finish()));
            }
        };

        if let Err(reason) = validate(&request) {
            tracing::debug!(uri = %request.uri, reason, "Rejecting request");
            return Some(conn.write_response(&Response::bad_request(), finish()));
        }

        tracing::debug!(method = %request.method, uri = %request.uri, remote = %request.remote_addr, "Handling request");

        let keep_alive = request.keep_alive();
        let next_handler = handler.clone();

        handler.handle(
            request,
            Box::new(move |response| {
                tracing::debug!(status = response.status.as_u16(), keep_alive, "Writing response");

                let then: Callback<()> = if keep_alive {
                    let conn = conn.clone();
                    Box::new(move |()| handle_connection(conn, next_handler))
                } else {
                    finish()
                };
                Some(conn.write_response(&response, then))
            }),
        )
    }))
}

fn validate(request: &Request) -> Result<(), &'static str> {
    if request.version == HTTP_VERSION_1_1 && !request.has_header("Host") {
        return Err("missing Host header");
    }
    Ok(())
}
