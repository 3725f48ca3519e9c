//! # Documentation Module
//!
//! Builds an OpenAPI 3.0 document from the endpoint catalog.
//!
//! ## Overview
//!
//! Static endpoint metadata (request fields, auth, rate limit) comes straight from
//! the catalog. The row shape inside each endpoint's response comes from a
//! [`SchemaDescriber`]: the query engine is asked to *describe* the endpoint's
//! query without executing it. When that fails for one endpoint, only that
//! endpoint's row schema is left empty and flagged with `x-schema-error`; the
//! rest of the document is unaffected.
//!
//! The document is a [`DocumentNode`] (`serde_json::Value` with insertion-ordered
//! objects). It is rebuilt on every call and never cached, so two calls against
//! the same catalog snapshot produce identical output.
//!
//! ## Example
//!
//! ```rust,ignore
//! use flapi::docs::{DocSynthesizer, SecuritySchemeCatalog, UnavailableDescriber};
//!
//! let synthesizer = DocSynthesizer::new(catalog, Arc::new(UnavailableDescriber));
//! let doc = synthesizer.synthesize("http://localhost:8080", &SecuritySchemeCatalog::standard());
//! println!("{}", flapi::docs::to_yaml(&doc)?);
//! ```

mod describe;
mod synthesizer;
#[cfg(test)]
mod tests;

pub use describe::{
    sql_type_to_schema, ColumnDescription, SchemaDescriber, StaticSchemaDescriber,
    UnavailableDescriber,
};
pub use synthesizer::{
    DocSynthesizer, SecuritySchemeCatalog, DEFAULT_DESCRIBE_TIMEOUT, OPENAPI_VERSION,
};

/// Order-preserving document tree produced by synthesis.
pub type DocumentNode = serde_json::Value;

/// Serialize a document as pretty-printed JSON.
pub fn to_json(doc: &DocumentNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Serialize a document as YAML.
pub fn to_yaml(doc: &DocumentNode) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(doc)
}
