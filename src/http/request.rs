use std::fmt;
use std::net::Ipv4Addr;

/// HTTP request methods.
///
/// The server only serves files for GET, but any syntactically valid token is
/// carried through so handlers can decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token, kept verbatim
    Extension(String),
}

/// A single header line. Keys keep the case they were received with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Requests only exist once the initial line and headers were validated, so
/// handlers can rely on `uri` starting with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target as sent (e.g., "/index.html?x=1")
    pub uri: String,
    /// HTTP version (e.g. "HTTP/1.1")
    pub version: String,
    /// Request headers in the order they were received
    pub headers: Vec<Header>,
    /// Request body, when a Content-Length was sent
    pub body: Vec<u8>,
    /// Address of the client that sent the request
    pub remote_addr: Ipv4Addr,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    version: Option<String>,
    headers: Vec<Header>,
    body: Vec<u8>,
    remote_addr: Ipv4Addr,
}

impl Method {
    /// Parses an HTTP method from a request-line token.
    ///
    /// Known methods are matched case-sensitively; other tokens become
    /// [`Method::Extension`]. Returns `None` for an empty token or one that
    /// contains characters not allowed in a method name.
    ///
    /// # Example
    ///
    /// ```
    /// # use sluice::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Some(Method::GET));
    /// assert_eq!(Method::parse("get"), Some(Method::Extension("get".to_string())));
    /// assert_eq!(Method::parse(""), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let method = match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            _ if is_token(s) => Method::Extension(s.to_string()),
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Extension(other) => other,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            uri: None,
            version: None,
            headers: Vec::new(),
            body: Vec::new(),
            remote_addr: Ipv4Addr::UNSPECIFIED,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Appends a header. Repeated keys are kept.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn remote_addr(mut self, addr: Ipv4Addr) -> Self {
        self.remote_addr = addr;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            uri: self.uri.ok_or("uri missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
            remote_addr: self.remote_addr,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves the first header with the given name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key)
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.header(key).is_some()
    }

    /// The Content-Length header, if present.
    ///
    /// `Some(Err(_))` when the header is present but not a number.
    pub fn content_length(&self) -> Option<Result<usize, std::num::ParseIntError>> {
        self.header("Content-Length").map(|v| v.trim().parse())
    }

    /// Whether the connection may be reused after the response.
    ///
    /// Only an explicit `Connection: close` ends the connection.
    pub fn keep_alive(&self) -> bool {
        self.header("Connection")
            .map(|v| !v.trim().eq_ignore_ascii_case("close"))
            .unwrap_or(true)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [Header], key: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| h.key.eq_ignore_ascii_case(key))
        .map(|h| h.value.as_str())
}
