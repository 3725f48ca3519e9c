use http::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Where a request field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Path,
    Query,
    Header,
}

impl FieldLocation {
    /// OpenAPI `in` value for this location.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLocation::Path => "path",
            FieldLocation::Query => "query",
            FieldLocation::Header => "header",
        }
    }
}

impl std::fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared request field of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequestField {
    pub field_name: String,
    pub field_in: FieldLocation,
    #[serde(default)]
    pub required: bool,
    /// Default value, kept as text whatever scalar the YAML used
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Authentication scheme an endpoint requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    #[default]
    Bearer,
    Basic,
}

impl AuthScheme {
    /// Name of the security scheme declaration this scheme refers to.
    pub fn scheme_name(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "bearerAuth",
            AuthScheme::Basic => "basicAuth",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPolicy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, rename = "type")]
    pub scheme: AuthScheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    #[serde(default)]
    pub enabled: bool,
    /// Requests allowed per interval
    #[serde(default = "default_rate_limit_max")]
    pub max: u32,
    /// Interval length in seconds
    #[serde(default = "default_rate_limit_interval")]
    pub interval: u64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max: default_rate_limit_max(),
            interval: default_rate_limit_interval(),
        }
    }
}

fn default_rate_limit_max() -> u32 {
    100
}

fn default_rate_limit_interval() -> u64 {
    60
}

/// One configured API surface: a URL template answered for a single method.
///
/// Immutable once loaded; a refresh replaces the whole catalog instead of
/// editing definitions in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointDefinition {
    /// Template such as `/customers/:customer_id/orders`
    pub url_path: String,
    #[serde(default = "default_method", with = "method_serde")]
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "request")]
    pub request_fields: Vec<RequestField>,
    #[serde(default)]
    pub auth: AuthPolicy,
    #[serde(default)]
    pub rate_limit: RateLimitPolicy,
    /// SQL template backing the endpoint; opaque to routing and documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_source: Option<String>,
    /// Connection names the query runs against; opaque here
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connection: Vec<String>,
}

impl EndpointDefinition {
    /// Minimal `GET` definition, mostly useful for building catalogs in code.
    pub fn new(url_path: impl Into<String>) -> Self {
        Self {
            url_path: url_path.into(),
            method: Method::GET,
            description: None,
            request_fields: Vec::new(),
            auth: AuthPolicy::default(),
            rate_limit: RateLimitPolicy::default(),
            template_source: None,
            connection: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_field(mut self, field: RequestField) -> Self {
        self.request_fields.push(field);
        self
    }

    pub fn with_auth(mut self, scheme: AuthScheme) -> Self {
        self.auth = AuthPolicy {
            enabled: true,
            scheme,
        };
        self
    }

    pub fn with_rate_limit(mut self, max: u32, interval: u64) -> Self {
        self.rate_limit = RateLimitPolicy {
            enabled: true,
            max,
            interval,
        };
        self
    }
}

fn default_method() -> Method {
    Method::GET
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory holding SQL templates
    pub path: PathBuf,
}

/// Project-level metadata, reported under `flapi` by `GET /config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(deserialize_with = "scalar_string")]
    pub project_name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub project_description: String,
    #[serde(default = "default_project_version", deserialize_with = "scalar_string")]
    pub project_version: String,
    /// Server URL advertised in generated documentation
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateConfig>,
}

impl ProjectMetadata {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_description: String::new(),
            project_version: default_project_version(),
            base_url: None,
            template: None,
        }
    }
}

fn default_project_version() -> String {
    "1.0.0".to_string()
}

/// A full configuration load: project metadata plus every endpoint, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(flatten)]
    pub project: ProjectMetadata,
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
    /// Extra YAML files, one endpoint each, appended after inline endpoints
    #[serde(default, skip_serializing)]
    pub endpoint_files: Vec<PathBuf>,
}

impl ProjectConfig {
    pub fn new(project: ProjectMetadata, endpoints: Vec<EndpointDefinition>) -> Self {
        Self {
            project,
            endpoints,
            endpoint_files: Vec::new(),
        }
    }
}

/// Accept any YAML scalar for a text setting; `default: 10` and `default: "10"`
/// mean the same thing.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(value).map(Some),
    }
}

/// Required text setting that may be written unquoted (`project_version: 1.0`).
///
/// Flattened structs are buffered before they reach the field, so a plain
/// `String` field would see a number instead of the source text.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?)
}

fn scalar_text<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!("expected a scalar value, found {other}"))),
    }
}

mod method_serde {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
            .map_err(|e| serde::de::Error::custom(format!("invalid method '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint: EndpointDefinition = serde_yaml::from_str("url-path: /customers").unwrap();
        assert_eq!(endpoint.method, Method::GET);
        assert!(endpoint.request_fields.is_empty());
        assert!(!endpoint.auth.enabled);
        assert_eq!(endpoint.auth.scheme, AuthScheme::Bearer);
        assert!(!endpoint.rate_limit.enabled);
    }

    #[test]
    fn test_endpoint_full_yaml() {
        let yaml = r#"
url-path: /customers/:customer_id/orders
method: delete
template-source: orders.sql
connection: [warehouse]
request:
  - field-name: customer_id
    field-in: path
    required: true
    description: Customer identifier
  - field-name: limit
    field-in: query
    default: 10
auth:
  enabled: true
  type: basic
rate-limit:
  enabled: true
  max: 5
  interval: 30
"#;
        let endpoint: EndpointDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(endpoint.method, Method::DELETE);
        assert_eq!(endpoint.template_source.as_deref(), Some("orders.sql"));
        assert_eq!(endpoint.connection, vec!["warehouse".to_string()]);
        assert_eq!(endpoint.request_fields.len(), 2);
        assert_eq!(endpoint.request_fields[0].field_in, FieldLocation::Path);
        assert!(endpoint.request_fields[0].required);
        assert_eq!(endpoint.request_fields[1].default.as_deref(), Some("10"));
        assert_eq!(endpoint.auth.scheme, AuthScheme::Basic);
        assert_eq!(endpoint.rate_limit.max, 5);
        assert_eq!(endpoint.rate_limit.interval, 30);
    }

    #[test]
    fn test_unknown_auth_type_is_rejected() {
        let yaml = "url-path: /x\nauth: { enabled: true, type: digest }";
        assert!(serde_yaml::from_str::<EndpointDefinition>(yaml).is_err());
    }

    #[test]
    fn test_project_metadata_defaults() {
        let config: ProjectConfig = serde_yaml::from_str("project_name: shop").unwrap();
        assert_eq!(config.project.project_name, "shop");
        assert_eq!(config.project.project_version, "1.0.0");
        assert!(config.endpoints.is_empty());
    }

    #[test]
    fn test_unquoted_metadata_scalars_are_text() {
        let yaml = "project_name: 2024\nproject_version: 1.0\nproject_description: true\n";
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.project.project_name, "2024");
        assert_eq!(config.project.project_version, "1.0");
        assert_eq!(config.project.project_description, "true");

        let nested = "project_name: shop\nproject_version: [1, 0]\n";
        assert!(serde_yaml::from_str::<ProjectConfig>(nested).is_err());
    }

    #[test]
    fn test_method_serializes_as_text() {
        let endpoint = EndpointDefinition::new("/a").with_method(Method::DELETE);
        let value = serde_json::to_value(&endpoint).unwrap();
        assert_eq!(value["method"], "DELETE");
        assert_eq!(value["url-path"], "/a");
    }
}
