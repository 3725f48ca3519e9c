//! Route resolution - hot path for every dynamic request.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::catalog::{CatalogSnapshot, EndpointCatalog};
use crate::config::EndpointDefinition;
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Captured path parameters in template order.
///
/// Names are `Arc<str>` shared with the compiled template; values are per-request
/// data decoded from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A request path resolved to its endpoint.
///
/// Owned by the request in flight. Holding the endpoint `Arc` keeps the
/// definition alive even if the catalog is replaced while the request runs.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub endpoint: Arc<EndpointDefinition>,
    pub path_params: ParamVec,
}

impl ResolvedRoute {
    /// Get a path parameter by name.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Copy the path parameters into a map.
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Matches concrete request paths against the catalog's URL templates.
///
/// The first candidate in configuration order that matches wins. No
/// specificity ranking is applied: operators list literal templates such as
/// `/items/active` before general ones such as `/items/:id`.
#[derive(Clone)]
pub struct RouteResolver {
    catalog: Arc<EndpointCatalog>,
}

impl RouteResolver {
    #[must_use]
    pub fn new(catalog: Arc<EndpointCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve against the catalog snapshot that is current right now.
    ///
    /// # Returns
    ///
    /// * `Some(ResolvedRoute)` - the first matching endpoint and its path parameters
    /// * `None` - nothing matches (answered with 404 at the transport boundary)
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<ResolvedRoute> {
        let snapshot = self.catalog.snapshot();
        Self::resolve_in(&snapshot, method, path)
    }

    /// Resolve against an explicit snapshot.
    ///
    /// Pure function of `snapshot`, `method` and `path`.
    #[must_use]
    pub fn resolve_in(
        snapshot: &CatalogSnapshot,
        method: &Method,
        path: &str,
    ) -> Option<ResolvedRoute> {
        let match_start = Instant::now();
        let candidates = snapshot.lookup_candidates(method);

        let result = candidates.iter().find_map(|entry| {
            entry.template.match_path(path).map(|path_params| ResolvedRoute {
                endpoint: Arc::clone(&entry.endpoint),
                path_params,
            })
        });

        let match_duration = match_start.elapsed();
        match &result {
            Some(route) => {
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        method = %method,
                        path = %path,
                        url_path = %route.endpoint.url_path,
                        candidates = candidates.len(),
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        method = %method,
                        path = %path,
                        url_path = %route.endpoint.url_path,
                        path_params = ?route.path_params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
            }
            None => {
                debug!(
                    method = %method,
                    path = %path,
                    candidates = candidates.len(),
                    "No route matched"
                );
            }
        }
        result
    }
}
