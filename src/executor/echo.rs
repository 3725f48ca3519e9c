use super::{QueryExecutor, QueryPage, QueryParams};
use crate::config::EndpointDefinition;
use serde_json::json;

/// Query executor that answers with the parameters it was given.
///
/// Used by `flapi serve` when no database backend is wired in, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoQueryExecutor;

impl QueryExecutor for EchoQueryExecutor {
    fn query(
        &self,
        endpoint: &EndpointDefinition,
        params: &QueryParams,
    ) -> anyhow::Result<QueryPage> {
        let row = json!({
            "url_path": endpoint.url_path,
            "method": endpoint.method.as_str(),
            "template_source": endpoint.template_source,
            "params": params,
        });
        Ok(QueryPage {
            rows: vec![row],
            next: None,
            total_count: 1,
        })
    }
}
