use super::describe::{sql_type_to_schema, ColumnDescription, SchemaDescriber};
use super::DocumentNode;
use crate::catalog::{CatalogEntry, CatalogSnapshot, EndpointCatalog};
use crate::config::{AuthScheme, EndpointDefinition, FieldLocation};
use crate::error::DescribeError;
use serde_json::{json, Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// OpenAPI version written to every document.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Per-endpoint describe limit used by the HTTP server.
pub const DEFAULT_DESCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Security scheme declarations placed under `components.securitySchemes`.
///
/// Declared unconditionally; endpoints reference them by name from their
/// `security` requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct SecuritySchemeCatalog {
    schemes: Vec<(String, Value)>,
}

impl SecuritySchemeCatalog {
    /// `bearerAuth` (JWT bearer) and `basicAuth`.
    pub fn standard() -> Self {
        Self {
            schemes: vec![
                (
                    AuthScheme::Bearer.scheme_name().to_string(),
                    json!({
                        "type": "http",
                        "scheme": "bearer",
                        "bearerFormat": "JWT",
                        "description": "JWT Authorization header using the Bearer scheme.",
                    }),
                ),
                (
                    AuthScheme::Basic.scheme_name().to_string(),
                    json!({
                        "type": "http",
                        "scheme": "basic",
                        "description": "Basic HTTP Authentication",
                    }),
                ),
            ],
        }
    }

    /// Add or replace a declaration.
    pub fn with_scheme(mut self, name: impl Into<String>, declaration: Value) -> Self {
        let name = name.into();
        match self.schemes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = declaration,
            None => self.schemes.push((name, declaration)),
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemes.iter().map(|(n, _)| n.as_str())
    }

    fn to_node(&self) -> Value {
        let map: Map<String, Value> = self.schemes.iter().cloned().collect();
        Value::Object(map)
    }
}

impl Default for SecuritySchemeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Produces OpenAPI documents for the endpoints currently in the catalog.
///
/// Endpoints are described one after another. With a describe timeout set,
/// each call runs on its own thread and an endpoint whose describer does not
/// answer in time is documented as a schema failure; the stuck call is left to
/// finish in the background.
#[derive(Clone)]
pub struct DocSynthesizer {
    catalog: Arc<EndpointCatalog>,
    describer: Arc<dyn SchemaDescriber>,
    describe_timeout: Option<Duration>,
}

impl DocSynthesizer {
    pub fn new(catalog: Arc<EndpointCatalog>, describer: Arc<dyn SchemaDescriber>) -> Self {
        Self {
            catalog,
            describer,
            describe_timeout: None,
        }
    }

    /// Bound the time spent waiting on the describer for any one endpoint.
    pub fn with_describe_timeout(mut self, timeout: Duration) -> Self {
        self.describe_timeout = Some(timeout);
        self
    }

    /// Synthesize against the snapshot that is current right now.
    pub fn synthesize(&self, base_url: &str, schemes: &SecuritySchemeCatalog) -> DocumentNode {
        let snapshot = self.catalog.snapshot();
        self.synthesize_snapshot(&snapshot, base_url, schemes)
    }

    /// Synthesize against an explicit snapshot.
    pub fn synthesize_snapshot(
        &self,
        snapshot: &CatalogSnapshot,
        base_url: &str,
        schemes: &SecuritySchemeCatalog,
    ) -> DocumentNode {
        let started = Instant::now();
        let project = snapshot.project();
        let mut paths = Map::new();
        let mut failures = 0usize;

        for entry in snapshot.entries() {
            let (operation, failed) = self.operation(entry);
            if failed {
                failures += 1;
            }
            let item = paths
                .entry(entry.template.to_openapi_path())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(item) = item {
                item.insert(
                    entry.endpoint.method.as_str().to_ascii_lowercase(),
                    operation,
                );
            }
        }

        info!(
            endpoints = snapshot.len(),
            paths = paths.len(),
            schema_failures = failures,
            duration_ms = started.elapsed().as_millis(),
            "OpenAPI document synthesized"
        );

        json!({
            "openapi": OPENAPI_VERSION,
            "info": {
                "title": project.project_name,
                "version": project.project_version,
                "description": project.project_description,
            },
            "servers": [{ "url": base_url }],
            "paths": paths,
            "components": {
                "securitySchemes": schemes.to_node(),
            },
        })
    }

    /// Build one operation object. The flag reports a schema description failure.
    fn operation(&self, entry: &CatalogEntry) -> (Value, bool) {
        let endpoint = entry.endpoint.as_ref();
        let mut op = Map::new();

        op.insert(
            "summary".into(),
            Value::String(format!("Endpoint for {}", endpoint.url_path)),
        );
        op.insert(
            "description".into(),
            Value::String(
                endpoint
                    .description
                    .clone()
                    .unwrap_or_else(|| "Description not available".to_string()),
            ),
        );
        op.insert("parameters".into(), Value::Array(parameters(entry)));

        let (items, failed) = match self.describe(entry) {
            Ok(columns) => (row_schema(&columns), false),
            Err(e) => {
                warn!(
                    url_path = %endpoint.url_path,
                    method = %endpoint.method,
                    error = %e,
                    "Schema description failed; documenting empty row schema"
                );
                (
                    json!({
                        "type": "object",
                        "properties": {},
                        "x-schema-error": e.to_string(),
                    }),
                    true,
                )
            }
        };

        op.insert(
            "responses".into(),
            json!({
                "200": {
                    "description": "Successful response",
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": {
                                    "data": { "type": "array", "items": items },
                                    "next": { "type": "string" },
                                    "total_count": { "type": "integer" },
                                },
                            },
                        },
                    },
                },
            }),
        );

        if endpoint.rate_limit.enabled {
            op.insert(
                "x-rate-limit".into(),
                json!({
                    "max": endpoint.rate_limit.max,
                    "interval": endpoint.rate_limit.interval,
                }),
            );
        }

        if endpoint.auth.enabled {
            let mut requirement = Map::new();
            requirement.insert(
                endpoint.auth.scheme.scheme_name().to_string(),
                Value::Array(Vec::new()),
            );
            op.insert(
                "security".into(),
                Value::Array(vec![Value::Object(requirement)]),
            );
        }

        (Value::Object(op), failed)
    }

    /// Ask the describer, converting a panic or a timeout into an error for this endpoint.
    fn describe(&self, entry: &CatalogEntry) -> Result<Vec<ColumnDescription>, DescribeError> {
        let started = Instant::now();
        let endpoint = entry.endpoint.as_ref();
        let result = match self.describe_timeout {
            Some(limit) => self.describe_bounded(entry, limit),
            None => describe_caught(self.describer.as_ref(), endpoint),
        };
        debug!(
            url_path = %endpoint.url_path,
            ok = result.is_ok(),
            duration_us = started.elapsed().as_micros(),
            "Described endpoint query"
        );
        result
    }

    fn describe_bounded(
        &self,
        entry: &CatalogEntry,
        limit: Duration,
    ) -> Result<Vec<ColumnDescription>, DescribeError> {
        let (tx, rx) = mpsc::sync_channel(1);
        let describer = Arc::clone(&self.describer);
        let endpoint = Arc::clone(&entry.endpoint);
        let spawned = thread::Builder::new()
            .name("flapi-describe".into())
            .spawn(move || {
                let result = describe_caught(describer.as_ref(), &endpoint);
                if tx.send(result).is_err() {
                    debug!(url_path = %endpoint.url_path, "Late describe result dropped");
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Could not start describer thread, describing inline");
            return describe_caught(self.describer.as_ref(), &entry.endpoint);
        }

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    url_path = %entry.endpoint.url_path,
                    timeout_ms = limit.as_millis(),
                    "Schema describer timed out"
                );
                Err(DescribeError::TimedOut { after: limit })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(DescribeError::Panicked),
        }
    }
}

fn describe_caught(
    describer: &dyn SchemaDescriber,
    endpoint: &EndpointDefinition,
) -> Result<Vec<ColumnDescription>, DescribeError> {
    catch_unwind(AssertUnwindSafe(|| describer.describe_query(endpoint)))
        .unwrap_or(Err(DescribeError::Panicked))
}

/// Declared request fields, then any capture the fields do not mention.
fn parameters(entry: &CatalogEntry) -> Vec<Value> {
    let endpoint = entry.endpoint.as_ref();
    let mut params: Vec<Value> = endpoint
        .request_fields
        .iter()
        .map(|field| {
            let mut schema = Map::new();
            schema.insert("type".into(), Value::String("string".into()));
            if let Some(default) = &field.default {
                schema.insert("default".into(), Value::String(default.clone()));
            }
            json!({
                "name": field.field_name,
                "in": field.field_in.as_str(),
                "required": field.required,
                "description": field.description,
                "schema": schema,
            })
        })
        .collect();

    for capture in entry.template.capture_names() {
        let declared = endpoint
            .request_fields
            .iter()
            .any(|f| f.field_in == FieldLocation::Path && f.field_name == capture);
        if !declared {
            params.push(json!({
                "name": capture,
                "in": "path",
                "required": true,
                "schema": { "type": "string" },
            }));
        }
    }
    params
}

fn row_schema(columns: &[ColumnDescription]) -> Value {
    let properties: Map<String, Value> = columns
        .iter()
        .map(|c| (c.name.clone(), sql_type_to_schema(&c.sql_type)))
        .collect();
    json!({ "type": "object", "properties": properties })
}
