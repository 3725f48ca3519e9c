//! # Executor Module
//!
//! Capability interfaces invoked by the transport boundary once a request has
//! been resolved to an endpoint.
//!
//! The gateway itself does not verify credentials, count requests, or talk to a
//! database. Those concerns are supplied from outside as trait objects:
//!
//! - [`Authenticator`] - verifies credentials for an endpoint's auth scheme
//! - [`RateLimiter`] - decides whether a request fits in the endpoint's budget
//! - [`QueryExecutor`] - runs the endpoint's query with the collected parameters
//!
//! [`PolicyExecutor`] composes them into a [`RequestExecutor`], enforcing each
//! endpoint's `auth` and `rate-limit` policy and its declared request fields
//! before the query runs.
//!
//! ```rust,ignore
//! let executor = PolicyExecutor::new(Arc::new(MyDuckDbExecutor::new(pool)))
//!     .with_authenticator(Arc::new(MyJwtAuthenticator::new(keys)))
//!     .with_rate_limiter(Arc::new(MyRedisLimiter::new(client)));
//! ```

mod echo;
mod policy;

pub use echo::EchoQueryExecutor;
pub use policy::{collect_params, PolicyExecutor};

use crate::config::{AuthScheme, EndpointDefinition, RateLimitPolicy};
use crate::router::ResolvedRoute;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Parameters handed to the query, keyed by request field name.
pub type QueryParams = BTreeMap<String, String>;

/// Request data beyond the path, as parsed by the transport.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
}

impl RequestContext {
    /// Get a header by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }
}

/// What an executor answers for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResponse {
    pub status: u16,
    pub body: Value,
}

impl ExecutionResponse {
    pub fn ok_json(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub rows: Vec<Value>,
    /// Cursor for the following page, if any
    pub next: Option<String>,
    pub total_count: u64,
}

impl QueryPage {
    /// The paginated response envelope documented for every endpoint.
    pub fn into_body(self) -> Value {
        serde_json::json!({
            "data": self.rows,
            "next": self.next.unwrap_or_default(),
            "total_count": self.total_count,
        })
    }
}

/// Handles a resolved request end to end.
pub trait RequestExecutor: Send + Sync {
    fn execute(&self, route: &ResolvedRoute, ctx: &RequestContext) -> ExecutionResponse;
}

/// Verifies the credentials presented for `scheme`.
pub trait Authenticator: Send + Sync {
    fn authenticate(
        &self,
        endpoint: &EndpointDefinition,
        scheme: AuthScheme,
        ctx: &RequestContext,
    ) -> bool;
}

/// Decides whether a request fits in the endpoint's rate-limit budget.
///
/// Counter storage belongs to the implementation.
pub trait RateLimiter: Send + Sync {
    fn allow(
        &self,
        endpoint: &EndpointDefinition,
        policy: &RateLimitPolicy,
        ctx: &RequestContext,
    ) -> bool;
}

/// Runs an endpoint's query.
pub trait QueryExecutor: Send + Sync {
    fn query(&self, endpoint: &EndpointDefinition, params: &QueryParams)
        -> anyhow::Result<QueryPage>;
}
