use crate::config::EndpointDefinition;
use crate::error::DescribeError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// One result column reported by the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    /// Engine type name, e.g. `VARCHAR`, `DECIMAL(18,3)`, `INTEGER[]`
    pub sql_type: String,
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// "Describe only" capability of the query engine.
///
/// Implementations report the result columns of an endpoint's query without
/// running it. They may fail; callers isolate each call.
///
/// Implementations must bound their own latency (connection and planning
/// timeouts). Endpoints are described sequentially, so a call that never
/// returns delays the whole document unless the synthesizer was built with
/// [`DocSynthesizer::with_describe_timeout`](super::DocSynthesizer::with_describe_timeout),
/// in which case the endpoint is documented as a schema failure and the call is
/// abandoned on its thread.
pub trait SchemaDescriber: Send + Sync {
    fn describe_query(
        &self,
        endpoint: &EndpointDefinition,
    ) -> Result<Vec<ColumnDescription>, DescribeError>;
}

/// Describer used when no query engine is attached.
///
/// Every endpoint is documented with an empty row schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDescriber;

impl SchemaDescriber for UnavailableDescriber {
    fn describe_query(&self, _: &EndpointDefinition) -> Result<Vec<ColumnDescription>, DescribeError> {
        Err(DescribeError::Unavailable)
    }
}

/// Describer backed by a fixed table of columns per `url-path`.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaDescriber {
    columns: HashMap<String, Vec<ColumnDescription>>,
}

impl StaticSchemaDescriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(
        mut self,
        url_path: impl Into<String>,
        columns: Vec<ColumnDescription>,
    ) -> Self {
        self.columns.insert(url_path.into(), columns);
        self
    }
}

impl SchemaDescriber for StaticSchemaDescriber {
    fn describe_query(
        &self,
        endpoint: &EndpointDefinition,
    ) -> Result<Vec<ColumnDescription>, DescribeError> {
        self.columns
            .get(&endpoint.url_path)
            .cloned()
            .ok_or_else(|| DescribeError::query(format!("no columns known for '{}'", endpoint.url_path)))
    }
}

/// Map an engine type name to a JSON schema fragment.
///
/// Parameterized types (`DECIMAL(18,3)`, `VARCHAR(64)`) are mapped by their base
/// name, `T[]` becomes an array of `T`, and anything unrecognized is a string.
pub fn sql_type_to_schema(sql_type: &str) -> Value {
    let ty = sql_type.trim();
    if let Some(inner) = ty.strip_suffix("[]") {
        return json!({ "type": "array", "items": sql_type_to_schema(inner) });
    }

    let base = ty
        .split('(')
        .next()
        .unwrap_or(ty)
        .trim()
        .to_ascii_uppercase();

    match base.as_str() {
        "BOOLEAN" | "BOOL" | "LOGICAL" => json!({ "type": "boolean" }),
        "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "INT1" | "INT2" | "INT4" | "INT8"
        | "BIGINT" | "HUGEINT" | "UTINYINT" | "USMALLINT" | "UINTEGER" | "UBIGINT"
        | "UHUGEINT" | "LONG" | "SHORT" => json!({ "type": "integer" }),
        "FLOAT" | "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE" | "DECIMAL" | "NUMERIC" => {
            json!({ "type": "number" })
        }
        "DATE" => json!({ "type": "string", "format": "date" }),
        "TIMESTAMP" | "DATETIME" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE"
        | "TIMESTAMP_S" | "TIMESTAMP_MS" | "TIMESTAMP_NS" => {
            json!({ "type": "string", "format": "date-time" })
        }
        "TIME" => json!({ "type": "string", "format": "time" }),
        "UUID" => json!({ "type": "string", "format": "uuid" }),
        "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => json!({ "type": "string", "format": "byte" }),
        "STRUCT" | "MAP" | "JSON" => json!({ "type": "object" }),
        "LIST" => json!({ "type": "array", "items": {} }),
        _ => json!({ "type": "string" }),
    }
}
