use crate::catalog::EndpointCatalog;
use crate::router::{ResolvedRoute, RouteResolver};
use http::Method;
use std::sync::Arc;

/// Result of dispatching one request.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Matched(ResolvedRoute),
    NotFound,
}

impl DispatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, DispatchOutcome::Matched(_))
    }

    pub fn into_route(self) -> Option<ResolvedRoute> {
        match self {
            DispatchOutcome::Matched(route) => Some(route),
            DispatchOutcome::NotFound => None,
        }
    }
}

impl From<Option<ResolvedRoute>> for DispatchOutcome {
    fn from(route: Option<ResolvedRoute>) -> Self {
        route.map_or(DispatchOutcome::NotFound, DispatchOutcome::Matched)
    }
}

/// Resolves incoming method/path pairs to endpoints.
#[derive(Clone)]
pub struct RequestDispatcher {
    resolver: RouteResolver,
}

impl RequestDispatcher {
    #[must_use]
    pub fn new(resolver: RouteResolver) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub fn from_catalog(catalog: Arc<EndpointCatalog>) -> Self {
        Self::new(RouteResolver::new(catalog))
    }

    #[must_use]
    pub fn dispatch(&self, method: &Method, path: &str) -> DispatchOutcome {
        self.resolver.resolve(method, path).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EndpointDefinition, ProjectConfig, ProjectMetadata};

    fn dispatcher() -> RequestDispatcher {
        let config = ProjectConfig::new(
            ProjectMetadata::new("dispatch"),
            vec![
                EndpointDefinition::new("/orders/:id"),
                EndpointDefinition::new("/orders/:id").with_method(Method::DELETE),
            ],
        );
        RequestDispatcher::from_catalog(Arc::new(EndpointCatalog::from_config(config).unwrap()))
    }

    #[test]
    fn test_dispatch_matches_per_method() {
        let d = dispatcher();
        let route = d.dispatch(&Method::DELETE, "/orders/5").into_route().unwrap();
        assert_eq!(route.endpoint.method, Method::DELETE);
        assert_eq!(route.get_path_param("id"), Some("5"));
        assert!(d.dispatch(&Method::GET, "/orders/5").is_matched());
    }

    #[test]
    fn test_dispatch_not_found() {
        let d = dispatcher();
        assert!(matches!(
            d.dispatch(&Method::GET, "/invoices/5"),
            DispatchOutcome::NotFound
        ));
        assert!(!d.dispatch(&Method::PUT, "/orders/5").is_matched());
    }
}
