use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
///
/// Any token is a valid method on the wire. Only `GET` is served; everything
/// else is answered with 501 Not Implemented by the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// Any other token
    Extension(String),
}

impl Method {
    /// Maps a method token onto a variant. Matching is case-sensitive, so
    /// `get` becomes an extension method.
    ///
    /// ```
    /// # use vhostd::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Extension("get".into()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::Extension(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol version from the request line, `HTTP/{major}.{minor}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const HTTP_1_0: Version = Version { major: 1, minor: 0 };
    pub const HTTP_1_1: Version = Version { major: 1, minor: 1 };

    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Versions below 1.1 get HTTP/1.0 treatment: no mandatory `Host`, and
    /// the connection closes after one exchange.
    pub fn is_legacy(&self) -> bool {
        *self < Version::HTTP_1_1
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// A fully parsed HTTP request head.
///
/// A `Request` only exists once the start line and every header line were
/// valid; the parser never hands out a partially filled one.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The raw request target, path plus optional query (e.g. "/a/b?x=1")
    pub target: String,
    /// Protocol version
    pub version: Version,
    /// Header fields keyed by their name as sent; later duplicates win
    pub headers: HashMap<String, String>,
    /// Lowercased field name -> spelling of the name that arrived last
    latest: HashMap<String, String>,
}

/// The request target split into path and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    /// Path without the query string
    pub uri: String,
    /// Query parameters; a key without `=` maps to an empty value
    pub params: HashMap<String, String>,
}

impl Target {
    /// Splits at the first `?`, then the query on `&` and each pair on its
    /// first `=`. No percent-decoding is applied.
    pub fn parse(target: &str) -> Self {
        let (uri, query) = target.split_once('?').unwrap_or((target, ""));

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (name.to_string(), value.to_string())
            })
            .collect();

        Self {
            uri: uri.to_string(),
            params,
        }
    }
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Version,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: Version::HTTP_1_1,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Adds a header; headers are applied in call order.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let mut req = Request::new(
            self.method.ok_or("method missing")?,
            self.target.ok_or("target missing")?,
            self.version,
        );
        for (name, value) in self.headers {
            req.insert_header(name, value);
        }
        Ok(req)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>, version: Version) -> Self {
        Self {
            method,
            target: target.into(),
            version,
            headers: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    /// Stores a header field. A field with the same name replaces the old
    /// value; the name spelling seen last also wins case-insensitive lookups.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.latest.insert(name.to_ascii_lowercase(), name.clone());
        self.headers.insert(name, value.into());
    }

    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// When the name was sent in several spellings, the one received last
    /// wins. Fields placed directly into `headers` are found by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.latest
            .get(&key.to_ascii_lowercase())
            .and_then(|name| self.headers.get(name))
            .or_else(|| self.headers.get(key))
            .map(|v| v.as_str())
    }

    /// The `Host` header, if the client sent one.
    pub fn host(&self) -> Option<&str> {
        self.header("Host")
    }

    /// Whether the client asked to close the connection with
    /// `Connection: close`.
    pub fn wants_close(&self) -> bool {
        self.header("Connection")
            .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case("close")))
            .unwrap_or(false)
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// HTTP/1.0 (and older) always closes; newer versions stay open unless
    /// `Connection: close` was sent.
    pub fn keep_alive(&self) -> bool {
        !self.version.is_legacy() && !self.wants_close()
    }

    /// Splits the target into path and query parameters.
    pub fn split_target(&self) -> Target {
        Target::parse(&self.target)
    }
}
