use super::{
    Authenticator, ExecutionResponse, QueryExecutor, QueryParams, RateLimiter, RequestContext,
    RequestExecutor,
};
use crate::config::FieldLocation;
use crate::router::ResolvedRoute;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Gather the declared request fields of the resolved endpoint.
///
/// Each field is read from its configured location, falling back to its
/// default. Fields that are neither present nor defaulted are left out, and
/// reported in the error when they are required.
pub fn collect_params(
    route: &ResolvedRoute,
    ctx: &RequestContext,
) -> Result<QueryParams, Vec<String>> {
    let mut params = QueryParams::new();
    let mut missing = Vec::new();

    for field in &route.endpoint.request_fields {
        let name = field.field_name.as_str();
        let value = match field.field_in {
            FieldLocation::Path => route.get_path_param(name),
            FieldLocation::Query => ctx.get_query(name),
            FieldLocation::Header => ctx.get_header(name),
        }
        .map(str::to_string)
        .or_else(|| field.default.clone());

        match value {
            Some(v) => {
                params.insert(field.field_name.clone(), v);
            }
            None if field.required => missing.push(field.field_name.clone()),
            None => {}
        }
    }

    if missing.is_empty() {
        Ok(params)
    } else {
        Err(missing)
    }
}

/// Enforces endpoint policies, then runs the query.
///
/// Order of checks: authentication (401), rate limit (429), required request
/// fields (400), query (500 on failure). An endpoint with auth enabled is
/// refused when no authenticator is configured; an endpoint with rate limiting
/// enabled is allowed through when no limiter is configured.
#[derive(Clone)]
pub struct PolicyExecutor {
    query: Arc<dyn QueryExecutor>,
    authenticator: Option<Arc<dyn Authenticator>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl PolicyExecutor {
    pub fn new(query: Arc<dyn QueryExecutor>) -> Self {
        Self {
            query,
            authenticator: None,
            rate_limiter: None,
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }
}

impl RequestExecutor for PolicyExecutor {
    fn execute(&self, route: &ResolvedRoute, ctx: &RequestContext) -> ExecutionResponse {
        let endpoint = route.endpoint.as_ref();

        if endpoint.auth.enabled {
            let scheme = endpoint.auth.scheme;
            let authorized = self
                .authenticator
                .as_ref()
                .is_some_and(|a| a.authenticate(endpoint, scheme, ctx));
            if !authorized {
                info!(
                    url_path = %endpoint.url_path,
                    scheme = scheme.scheme_name(),
                    authenticator = self.authenticator.is_some(),
                    "Request rejected: unauthorized"
                );
                return ExecutionResponse::error(401, "Unauthorized");
            }
        }

        if endpoint.rate_limit.enabled {
            let allowed = self
                .rate_limiter
                .as_ref()
                .is_none_or(|l| l.allow(endpoint, &endpoint.rate_limit, ctx));
            if !allowed {
                warn!(
                    url_path = %endpoint.url_path,
                    max = endpoint.rate_limit.max,
                    interval = endpoint.rate_limit.interval,
                    "Request rejected: rate limit exceeded"
                );
                return ExecutionResponse::error(429, "Too Many Requests");
            }
        }

        let params = match collect_params(route, ctx) {
            Ok(params) => params,
            Err(missing) => {
                debug!(url_path = %endpoint.url_path, missing = ?missing, "Missing required fields");
                return ExecutionResponse {
                    status: 400,
                    body: json!({ "error": "Missing required fields", "fields": missing }),
                };
            }
        };

        match self.query.query(endpoint, &params) {
            Ok(page) => ExecutionResponse::ok_json(page.into_body()),
            Err(e) => {
                let detail = format!("{e:#}");
                error!(url_path = %endpoint.url_path, error = %detail, "Query execution failed");
                ExecutionResponse::error(500, format!("Query failed: {detail}"))
            }
        }
    }
}
