use http::Method;
use std::fmt;
use std::time::Duration;

/// Configuration error raised while compiling an endpoint catalog.
///
/// Returned by [`crate::catalog::CatalogSnapshot::build`] and therefore by every
/// load or refresh path. A refresh that fails with one of these leaves the
/// previously active catalog in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The URL template is malformed
    ///
    /// Covers a missing leading `/`, empty segments (`//`), a trailing slash and
    /// capture segments with an empty or invalid name.
    InvalidTemplate {
        /// The offending template
        url_path: String,
        /// What is wrong with it
        reason: String,
    },
    /// The same capture name appears twice in one template
    DuplicateCapture {
        /// The offending template
        url_path: String,
        /// The repeated capture name
        name: String,
    },
    /// Two endpoints for one method have identically shaped templates
    ///
    /// The later endpoint could never be reached.
    AmbiguousTemplate {
        /// HTTP method shared by both endpoints
        method: Method,
        /// Template of the endpoint being rejected
        url_path: String,
        /// Template of the earlier endpoint it collides with
        conflicts_with: String,
    },
    /// The endpoint answers a method the gateway does not route
    UnsupportedMethod {
        /// The offending template
        url_path: String,
        /// The configured method
        method: Method,
    },
    /// A request field declared `field-in: path` has no matching capture segment
    UnboundPathField {
        /// The offending template
        url_path: String,
        /// The field name with no capture
        field: String,
    },
    /// A path request field is declared `required: false`
    ///
    /// Every capture binds a non-empty segment, so a path value is never absent.
    OptionalPathField {
        /// The offending template
        url_path: String,
        /// The path field marked optional
        field: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTemplate { url_path, reason } => {
                write!(f, "invalid url-path '{url_path}': {reason}")
            }
            ConfigError::DuplicateCapture { url_path, name } => {
                write!(
                    f,
                    "invalid url-path '{url_path}': capture ':{name}' is declared more than once"
                )
            }
            ConfigError::AmbiguousTemplate {
                method,
                url_path,
                conflicts_with,
            } => {
                write!(
                    f,
                    "ambiguous endpoint {method} '{url_path}': matches exactly the same paths as \
                     the earlier endpoint '{conflicts_with}'"
                )
            }
            ConfigError::UnsupportedMethod { url_path, method } => {
                write!(f, "endpoint '{url_path}' uses unsupported method {method}")
            }
            ConfigError::UnboundPathField { url_path, field } => {
                write!(
                    f,
                    "endpoint '{url_path}' declares path field '{field}' but the url-path has no \
                     ':{field}' segment"
                )
            }
            ConfigError::OptionalPathField { url_path, field } => {
                write!(
                    f,
                    "endpoint '{url_path}' declares path field '{field}' as optional; path fields \
                     must be required"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure of the query engine's describe-only capability for one endpoint.
///
/// Never fatal: the documentation entry for that endpoint is marked and
/// synthesis continues with the next endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescribeError {
    /// No query engine able to describe queries is attached
    Unavailable,
    /// The engine rejected or could not plan the query
    Query {
        /// Engine-provided detail
        reason: String,
    },
    /// The describer panicked while describing the query
    Panicked,
    /// The describer did not answer within the synthesizer's time limit
    TimedOut {
        /// The limit that was exceeded
        after: Duration,
    },
}

impl DescribeError {
    /// Convenience constructor for engine-side failures.
    pub fn query(reason: impl Into<String>) -> Self {
        DescribeError::Query {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DescribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescribeError::Unavailable => write!(f, "schema description is not available"),
            DescribeError::Query { reason } => write!(f, "failed to describe query: {reason}"),
            DescribeError::Panicked => write!(f, "schema describer panicked"),
            DescribeError::TimedOut { after } => {
                write!(f, "schema description timed out after {}ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for DescribeError {}
