use super::request::{parse_request, ParsedRequest};
use super::response::{write_reply, Reply};
use crate::catalog::EndpointCatalog;
use crate::config::ConfigSource;
use crate::dispatcher::{DispatchOutcome, RequestDispatcher};
use crate::docs::{
    self, DocSynthesizer, SchemaDescriber, SecuritySchemeCatalog, DEFAULT_DESCRIBE_TIMEOUT,
};
use crate::executor::RequestExecutor;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info};

const BANNER: &str = r"
         ___
     ___( o)>   Welcome to
     \ <_. )    flAPI
      `---'

    Fast and Flexible API Framework
";

/// HTTP front of the gateway.
///
/// Serves the fixed administrative routes (`/`, `/health`, `/config`,
/// `/openapi.json`, `/openapi.yaml`) and hands every other request, whatever
/// its method, to the [`RequestDispatcher`]. Matched requests go to the configured
/// [`RequestExecutor`].
#[derive(Clone)]
pub struct GatewayService {
    catalog: Arc<EndpointCatalog>,
    dispatcher: RequestDispatcher,
    executor: Arc<dyn RequestExecutor>,
    docs: DocSynthesizer,
    config_source: Arc<dyn ConfigSource>,
    security_schemes: Arc<SecuritySchemeCatalog>,
    base_url: Option<String>,
}

impl GatewayService {
    pub fn new(
        catalog: Arc<EndpointCatalog>,
        config_source: Arc<dyn ConfigSource>,
        executor: Arc<dyn RequestExecutor>,
        describer: Arc<dyn SchemaDescriber>,
    ) -> Self {
        Self {
            dispatcher: RequestDispatcher::from_catalog(Arc::clone(&catalog)),
            docs: DocSynthesizer::new(Arc::clone(&catalog), describer)
                .with_describe_timeout(DEFAULT_DESCRIBE_TIMEOUT),
            catalog,
            executor,
            config_source,
            security_schemes: Arc::new(SecuritySchemeCatalog::standard()),
            base_url: None,
        }
    }

    /// Server URL advertised in generated documents, overriding `base_url` from the project config.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Answer one request.
    pub fn handle(&self, req: &ParsedRequest) -> Reply {
        let Some(method) = req.method.as_ref() else {
            return Reply::text(404, "Not Found");
        };

        match (method, req.path.as_str()) {
            (&Method::GET, "/") => Reply::text(200, BANNER),
            (&Method::GET, "/health") => Reply::json(200, &json!({ "status": "ok" })),
            (&Method::GET, "/config") => self.config_dump(),
            (&Method::DELETE, "/config") => self.refresh_config(),
            (&Method::GET, "/openapi.json") => self.openapi(req, false),
            (&Method::GET, "/openapi.yaml") => self.openapi(req, true),
            _ => self.dispatch(method, req),
        }
    }

    fn dispatch(&self, method: &Method, req: &ParsedRequest) -> Reply {
        match self.dispatcher.dispatch(method, &req.path) {
            DispatchOutcome::Matched(route) => {
                let response = self.executor.execute(&route, &req.to_context());
                debug!(
                    method = %method,
                    path = %req.path,
                    url_path = %route.endpoint.url_path,
                    status = response.status,
                    "Request executed"
                );
                Reply::json(response.status, &response.body)
            }
            DispatchOutcome::NotFound => Reply::text(404, "Not Found"),
        }
    }

    fn config_dump(&self) -> Reply {
        let snapshot = self.catalog.snapshot();
        match serde_json::to_string_pretty(&snapshot.dump()) {
            Ok(body) => Reply::json_pretty(200, body),
            Err(e) => {
                error!(error = %e, "Failed to serialize configuration");
                Reply::text(500, format!("Internal Server Error: {e}"))
            }
        }
    }

    fn refresh_config(&self) -> Reply {
        info!("Config refresh requested");
        match self.catalog.refresh(self.config_source.as_ref()) {
            Ok(_) => Reply::text(200, "Configuration refreshed successfully"),
            Err(e) => Reply::text(500, format!("Failed to refresh configuration: {e:#}")),
        }
    }

    fn openapi(&self, req: &ParsedRequest, yaml: bool) -> Reply {
        let snapshot = self.catalog.snapshot();
        let base_url = self
            .base_url
            .clone()
            .or_else(|| snapshot.project().base_url.clone())
            .or_else(|| req.header("host").map(|host| format!("http://{host}")))
            .unwrap_or_else(|| "/".to_string());

        let doc = self
            .docs
            .synthesize_snapshot(&snapshot, &base_url, &self.security_schemes);

        let rendered = if yaml {
            docs::to_yaml(&doc)
                .map(|body| Reply::yaml(200, body))
                .map_err(|e| e.to_string())
        } else {
            docs::to_json(&doc)
                .map(|body| Reply::json_pretty(200, body))
                .map_err(|e| e.to_string())
        };
        rendered.unwrap_or_else(|e| {
            error!(error = %e, "Failed to serialize OpenAPI document");
            Reply::text(500, format!("Internal Server Error: {e}"))
        })
    }
}

impl HttpService for GatewayService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(&req);
        let reply = self.handle(&parsed);
        write_reply(res, reply);
        Ok(())
    }
}
