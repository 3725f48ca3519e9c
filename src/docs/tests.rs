use super::*;
use crate::catalog::EndpointCatalog;
use crate::config::{
    AuthScheme, EndpointDefinition, FieldLocation, ProjectConfig, ProjectMetadata, RequestField,
};
use crate::error::DescribeError;
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct FailsFor(&'static str);

impl SchemaDescriber for FailsFor {
    fn describe_query(
        &self,
        endpoint: &EndpointDefinition,
    ) -> Result<Vec<ColumnDescription>, DescribeError> {
        if endpoint.url_path == self.0 {
            return Err(DescribeError::query("Catalog Error: Table 'orders' does not exist"));
        }
        Ok(vec![
            ColumnDescription::new("id", "INTEGER"),
            ColumnDescription::new("name", "VARCHAR"),
        ])
    }
}

struct PanicsFor(&'static str);

impl SchemaDescriber for PanicsFor {
    fn describe_query(
        &self,
        endpoint: &EndpointDefinition,
    ) -> Result<Vec<ColumnDescription>, DescribeError> {
        if endpoint.url_path == self.0 {
            panic!("describer blew up");
        }
        Ok(vec![ColumnDescription::new("id", "BIGINT")])
    }
}

struct StallsFor(&'static str);

impl SchemaDescriber for StallsFor {
    fn describe_query(
        &self,
        endpoint: &EndpointDefinition,
    ) -> Result<Vec<ColumnDescription>, DescribeError> {
        if endpoint.url_path == self.0 {
            std::thread::sleep(Duration::from_secs(3));
        }
        Ok(vec![ColumnDescription::new("id", "INTEGER")])
    }
}

fn project() -> ProjectMetadata {
    let mut project = ProjectMetadata::new("customer-api");
    project.project_description = "Customer data".into();
    project.project_version = "2.1.0".into();
    project
}

fn synthesizer(
    endpoints: Vec<EndpointDefinition>,
    describer: Arc<dyn SchemaDescriber>,
) -> DocSynthesizer {
    let catalog = EndpointCatalog::from_config(ProjectConfig::new(project(), endpoints)).unwrap();
    DocSynthesizer::new(Arc::new(catalog), describer)
}

fn items<'a>(doc: &'a Value, path: &str, method: &str) -> &'a Value {
    &doc["paths"][path][method]["responses"]["200"]["content"]["application/json"]["schema"]
        ["properties"]["data"]["items"]
}

#[test]
fn test_document_metadata() {
    let s = synthesizer(Vec::new(), Arc::new(UnavailableDescriber));
    let doc = s.synthesize("https://api.example.com", &SecuritySchemeCatalog::standard());
    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(doc["info"]["title"], "customer-api");
    assert_eq!(doc["info"]["version"], "2.1.0");
    assert_eq!(doc["info"]["description"], "Customer data");
    assert_eq!(doc["servers"], json!([{ "url": "https://api.example.com" }]));
    assert_eq!(doc["paths"], json!({}));
}

#[test]
fn test_security_schemes_declared_without_auth_endpoints() {
    let s = synthesizer(
        vec![EndpointDefinition::new("/open")],
        Arc::new(UnavailableDescriber),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    let schemes = &doc["components"]["securitySchemes"];
    assert_eq!(schemes["bearerAuth"]["scheme"], "bearer");
    assert_eq!(schemes["bearerAuth"]["bearerFormat"], "JWT");
    assert_eq!(schemes["basicAuth"]["scheme"], "basic");
    assert!(doc["paths"]["/open"]["get"].get("security").is_none());
}

#[test]
fn test_operation_contents() {
    let endpoint = EndpointDefinition::new("/customers/:customer_id/orders")
        .with_field(RequestField {
            field_name: "customer_id".into(),
            field_in: FieldLocation::Path,
            required: true,
            default: None,
            description: "Customer identifier".into(),
        })
        .with_field(RequestField {
            field_name: "limit".into(),
            field_in: FieldLocation::Query,
            required: false,
            default: Some("25".into()),
            description: String::new(),
        })
        .with_auth(AuthScheme::Basic)
        .with_rate_limit(10, 30);
    let s = synthesizer(vec![endpoint], Arc::new(FailsFor("/none")));
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());

    let op = &doc["paths"]["/customers/{customer_id}/orders"]["get"];
    assert_eq!(op["summary"], "Endpoint for /customers/:customer_id/orders");
    assert_eq!(op["description"], "Description not available");
    assert_eq!(
        op["parameters"],
        json!([
            {
                "name": "customer_id",
                "in": "path",
                "required": true,
                "description": "Customer identifier",
                "schema": { "type": "string" }
            },
            {
                "name": "limit",
                "in": "query",
                "required": false,
                "description": "",
                "schema": { "type": "string", "default": "25" }
            }
        ])
    );
    assert_eq!(op["x-rate-limit"], json!({ "max": 10, "interval": 30 }));
    assert_eq!(op["security"], json!([{ "basicAuth": [] }]));

    let schema = &op["responses"]["200"]["content"]["application/json"]["schema"];
    assert_eq!(schema["properties"]["next"]["type"], "string");
    assert_eq!(schema["properties"]["total_count"]["type"], "integer");
    assert_eq!(
        items(&doc, "/customers/{customer_id}/orders", "get")["properties"],
        json!({ "id": { "type": "integer" }, "name": { "type": "string" } })
    );
}

#[test]
fn test_undeclared_capture_is_documented() {
    let s = synthesizer(
        vec![EndpointDefinition::new("/items/:id")],
        Arc::new(UnavailableDescriber),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert_eq!(
        doc["paths"]["/items/{id}"]["get"]["parameters"],
        json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }])
    );
}

#[test]
fn test_methods_merge_into_one_path_item() {
    let s = synthesizer(
        vec![
            EndpointDefinition::new("/items/:id"),
            EndpointDefinition::new("/items/:id").with_method(Method::DELETE),
        ],
        Arc::new(UnavailableDescriber),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    let item = doc["paths"]["/items/{id}"].as_object().unwrap();
    assert_eq!(item.keys().collect::<Vec<_>>(), vec!["get", "delete"]);
}

#[test]
fn test_synthesis_is_deterministic() {
    let s = synthesizer(
        vec![
            EndpointDefinition::new("/b").with_rate_limit(5, 1),
            EndpointDefinition::new("/a").with_auth(AuthScheme::Bearer),
            EndpointDefinition::new("/c/:id"),
        ],
        Arc::new(FailsFor("/c/:id")),
    );
    let schemes = SecuritySchemeCatalog::standard();
    let first = to_json(&s.synthesize("http://localhost", &schemes)).unwrap();
    let second = to_json(&s.synthesize("http://localhost", &schemes)).unwrap();
    assert_eq!(first, second);

    // Configuration order is kept
    let doc: Value = serde_json::from_str(&first).unwrap();
    let keys: Vec<&String> = doc["paths"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["/b", "/a", "/c/{id}"]);
}

#[test]
fn test_one_failing_endpoint_is_isolated() {
    let s = synthesizer(
        vec![
            EndpointDefinition::new("/customers"),
            EndpointDefinition::new("/orders"),
            EndpointDefinition::new("/products"),
        ],
        Arc::new(FailsFor("/orders")),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert_eq!(doc["paths"].as_object().unwrap().len(), 3);

    let failed = items(&doc, "/orders", "get");
    assert_eq!(failed["properties"], json!({}));
    assert_eq!(
        failed["x-schema-error"],
        "failed to describe query: Catalog Error: Table 'orders' does not exist"
    );

    for ok in ["/customers", "/products"] {
        let items = items(&doc, ok, "get");
        assert!(items.get("x-schema-error").is_none());
        assert_eq!(items["properties"]["id"]["type"], "integer");
    }
}

#[test]
fn test_panicking_describer_is_isolated() {
    let s = synthesizer(
        vec![EndpointDefinition::new("/bad"), EndpointDefinition::new("/good")],
        Arc::new(PanicsFor("/bad")),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert_eq!(items(&doc, "/bad", "get")["x-schema-error"], "schema describer panicked");
    assert_eq!(
        items(&doc, "/good", "get")["properties"]["id"]["type"],
        "integer"
    );
}

#[test]
fn test_stalled_describer_does_not_hold_up_the_document() {
    let s = synthesizer(
        vec![EndpointDefinition::new("/slow"), EndpointDefinition::new("/fast")],
        Arc::new(StallsFor("/slow")),
    )
    .with_describe_timeout(Duration::from_millis(50));

    let started = Instant::now();
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert!(started.elapsed() < Duration::from_secs(2));

    assert_eq!(
        items(&doc, "/slow", "get")["x-schema-error"],
        "schema description timed out after 50ms"
    );
    assert_eq!(items(&doc, "/fast", "get")["properties"]["id"]["type"], "integer");
}

#[test]
fn test_timeout_still_isolates_panics() {
    let s = synthesizer(
        vec![EndpointDefinition::new("/bad"), EndpointDefinition::new("/good")],
        Arc::new(PanicsFor("/bad")),
    )
    .with_describe_timeout(Duration::from_secs(5));
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert_eq!(items(&doc, "/bad", "get")["x-schema-error"], "schema describer panicked");
    assert_eq!(items(&doc, "/good", "get")["properties"]["id"]["type"], "integer");
}

#[test]
fn test_unavailable_describer_marks_every_endpoint() {
    let s = synthesizer(
        vec![EndpointDefinition::new("/a")],
        Arc::new(UnavailableDescriber),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert_eq!(
        items(&doc, "/a", "get")["x-schema-error"],
        "schema description is not available"
    );
}

#[test]
fn test_static_describer() {
    let describer = StaticSchemaDescriber::new()
        .with_columns("/a", vec![ColumnDescription::new("created", "TIMESTAMP")]);
    let s = synthesizer(
        vec![EndpointDefinition::new("/a"), EndpointDefinition::new("/b")],
        Arc::new(describer),
    );
    let doc = s.synthesize("http://localhost", &SecuritySchemeCatalog::standard());
    assert_eq!(
        items(&doc, "/a", "get")["properties"]["created"],
        json!({ "type": "string", "format": "date-time" })
    );
    assert!(items(&doc, "/b", "get").get("x-schema-error").is_some());
}

#[test]
fn test_json_and_yaml_round_trip() {
    let s = synthesizer(
        vec![
            EndpointDefinition::new("/customers/:id")
                .with_auth(AuthScheme::Bearer)
                .with_rate_limit(100, 60),
            EndpointDefinition::new("/orders"),
        ],
        Arc::new(FailsFor("/orders")),
    );
    let doc = s.synthesize("http://localhost:8080", &SecuritySchemeCatalog::standard());

    let from_json: Value = serde_json::from_str(&to_json(&doc).unwrap()).unwrap();
    assert_eq!(from_json, doc);

    let from_yaml: Value = serde_yaml::from_str(&to_yaml(&doc).unwrap()).unwrap();
    assert_eq!(from_yaml, doc);
}

#[test]
fn test_synthesize_pinned_snapshot() {
    let catalog = Arc::new(
        EndpointCatalog::from_config(ProjectConfig::new(
            project(),
            vec![EndpointDefinition::new("/old")],
        ))
        .unwrap(),
    );
    let s = DocSynthesizer::new(Arc::clone(&catalog), Arc::new(UnavailableDescriber));
    let pinned = catalog.snapshot();
    catalog
        .replace_all(ProjectConfig::new(project(), vec![EndpointDefinition::new("/new")]))
        .unwrap();

    let schemes = SecuritySchemeCatalog::standard();
    let old = s.synthesize_snapshot(&pinned, "http://localhost", &schemes);
    let new = s.synthesize("http://localhost", &schemes);
    assert!(old["paths"].get("/old").is_some());
    assert!(new["paths"].get("/new").is_some());
    assert!(new["paths"].get("/old").is_none());
}

#[test]
fn test_custom_security_scheme() {
    let schemes = SecuritySchemeCatalog::standard()
        .with_scheme("apiKey", json!({ "type": "apiKey", "in": "header", "name": "X-API-Key" }));
    assert_eq!(
        schemes.names().collect::<Vec<_>>(),
        vec!["bearerAuth", "basicAuth", "apiKey"]
    );
}

#[test]
fn test_sql_type_mapping() {
    assert_eq!(sql_type_to_schema("BIGINT"), json!({ "type": "integer" }));
    assert_eq!(sql_type_to_schema("decimal(18,3)"), json!({ "type": "number" }));
    assert_eq!(sql_type_to_schema("VARCHAR(64)"), json!({ "type": "string" }));
    assert_eq!(sql_type_to_schema("BOOLEAN"), json!({ "type": "boolean" }));
    assert_eq!(
        sql_type_to_schema("DATE"),
        json!({ "type": "string", "format": "date" })
    );
    assert_eq!(
        sql_type_to_schema("INTEGER[]"),
        json!({ "type": "array", "items": { "type": "integer" } })
    );
    assert_eq!(sql_type_to_schema("GEOMETRY"), json!({ "type": "string" }));
}
