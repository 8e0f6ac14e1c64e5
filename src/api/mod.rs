//! Analysis service client
//!
//! The remote service ingests a statement, extracts its transaction tables,
//! produces insights and answers free-form questions about it. Everything
//! after ingestion is keyed by the identity `submit` returns.
//!
//! Two implementations of [`AnalysisService`]:
//! - [`HttpAnalysisService`]: JSON over HTTP (production)
//! - [`MockAnalysisService`]: canned responses and call counters (testing)

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use http::HttpAnalysisService;
pub use mock::MockAnalysisService;

/// Remote operations the client depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Submit,
    Tables,
    Insights,
    Query,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Submit => "submit",
            Endpoint::Tables => "get_tables",
            Endpoint::Insights => "get_insights",
            Endpoint::Query => "query",
        }
    }
}

/// Document bytes handed to `submit`.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRequest<'a> {
    pub id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub id: &'a str,
    pub query: &'a str,
}

/// One JSON-encoded table, or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TablePayload {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    pub result: TablePayload,
}

/// Insights arrive wrapped twice: `{"result": {"result": {...}}}`. The outer
/// layer is stripped here, the inner one by the insights adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: String,
    #[serde(default)]
    pub source_documents: Vec<String>,
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Ingest a document; returns its server identity.
    async fn submit(&self, upload: &DocumentUpload) -> Result<SubmitResponse>;

    async fn get_tables(&self, id: &str) -> Result<TablesResponse>;

    async fn get_insights(&self, id: &str) -> Result<InsightsResponse>;

    /// Ask a question about the document.
    async fn query(&self, id: &str, query: &str) -> Result<QueryResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_payload_accepts_both_shapes() {
        let one: TablesResponse = serde_json::from_str(r#"{"result": "[]"}"#).unwrap();
        assert_eq!(one.result, TablePayload::One("[]".into()));

        let many: TablesResponse = serde_json::from_str(r#"{"result": ["[]", "[{}]"]}"#).unwrap();
        assert_eq!(
            many.result,
            TablePayload::Many(vec!["[]".into(), "[{}]".into()])
        );
    }

    #[test]
    fn query_response_tolerates_missing_sources() {
        let resp: QueryResponse = serde_json::from_str(r#"{"result": "42"}"#).unwrap();
        assert_eq!(resp.result, "42");
        assert!(resp.source_documents.is_empty());
    }
}
