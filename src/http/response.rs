use std::time::SystemTime;

use crate::http::request::{Header, find_header};

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = concat!("sluice/", env!("CARGO_PKG_VERSION"));

pub const HTTP_VERSION_1_1: &str = "HTTP/1.1";

/// HTTP status codes supported by the server.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request
/// - `Forbidden` (403): Access denied by file permissions or an access list
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use sluice::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP version of the status line
    pub version: String,
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers in the order they will be written
    pub headers: Vec<Header>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use sluice::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<Header>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Appends a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Server` first and `Content-Length` (from the body) if they were
    /// not set explicitly.
    pub fn build(mut self) -> Response {
        if find_header(&self.headers, "Server").is_none() {
            self.headers.insert(0, Header::new("Server", SERVER_NAME));
        }
        if find_header(&self.headers, "Content-Length").is_none() {
            let position = 1.min(self.headers.len());
            self.headers
                .insert(position, Header::new("Content-Length", self.body.len().to_string()));
        }

        Response {
            version: HTTP_VERSION_1_1.to_string(),
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// A 200 response carrying a file.
    pub fn ok(body: impl Into<Vec<u8>>, content_type: &str, last_modified: SystemTime) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .header("Last-Modified", httpdate::fmt_http_date(last_modified))
            .body(body.into())
            .build()
    }

    /// An empty-bodied response with only `Server` and `Content-Length: 0`.
    pub fn error(status: StatusCode) -> Self {
        ResponseBuilder::new(status).build()
    }

    pub fn bad_request() -> Self {
        Self::error(StatusCode::BadRequest)
    }

    pub fn forbidden() -> Self {
        Self::error(StatusCode::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::error(StatusCode::NotFound)
    }

    pub fn internal_error() -> Self {
        Self::error(StatusCode::InternalServerError)
    }

    /// Retrieves the first header with the given name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key)
    }
}
