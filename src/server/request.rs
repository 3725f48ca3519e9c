use crate::executor::RequestContext;
use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use tracing::debug;

/// Parsed HTTP request data used by `GatewayService`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    /// Request method as sent; `None` when it is not a valid HTTP token
    pub method: Option<Method>,
    /// Raw path without the query string, still percent-encoded
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Decoded query string parameters
    pub query_params: HashMap<String, String>,
}

impl ParsedRequest {
    /// Build a request from a raw method and target (`/path?query`).
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: Method::from_bytes(method.as_bytes()).ok(),
            path: target.split('?').next().unwrap_or("/").to_string(),
            headers: HashMap::new(),
            query_params: parse_query_params(target),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Context handed to the request executor.
    pub fn to_context(&self) -> RequestContext {
        RequestContext {
            method: self.method.clone().unwrap_or_default(),
            path: self.path.clone(),
            headers: self.headers.clone(),
            query_params: self.query_params.clone(),
        }
    }
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character and URL-decodes parameter names and values.
/// Later occurrences of a repeated name win.
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Extract method, path, headers and query parameters from a `may_minihttp::Request`.
pub fn parse_request(req: &Request) -> ParsedRequest {
    let mut parsed = ParsedRequest::new(req.method(), req.path());

    parsed.headers = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    debug!(
        method = %req.method(),
        path = %parsed.path,
        header_count = parsed.headers.len(),
        query_params = ?parsed.query_params,
        "HTTP request parsed"
    );

    parsed
}
