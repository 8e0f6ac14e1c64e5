use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{
    AnalysisService, DocumentUpload, Endpoint, InsightsResponse, QueryResponse, SubmitResponse,
    TablePayload, TablesResponse,
};
use crate::error::{FinsightsError, Result};

enum Canned<T> {
    Ok(T),
    Fail(String),
}

/// Analysis service double for tests.
///
/// Unconfigured endpoints fail with a network error. Every call is counted
/// before any gate is awaited, so a call blocked on the gate still shows up
/// in [`MockAnalysisService::calls`].
pub struct MockAnalysisService {
    submit: Canned<String>,
    tables: Canned<TablePayload>,
    insights: Canned<serde_json::Value>,
    answers: Mutex<Vec<String>>,
    query_failure: Option<String>,
    gates: HashMap<Endpoint, Arc<Semaphore>>,
    calls: Mutex<HashMap<Endpoint, usize>>,
    queries: Mutex<Vec<(String, String)>>,
}

impl Default for MockAnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalysisService {
    pub fn new() -> Self {
        Self {
            submit: Canned::Fail("submit not configured".into()),
            tables: Canned::Fail("get_tables not configured".into()),
            insights: Canned::Fail("get_insights not configured".into()),
            answers: Mutex::new(Vec::new()),
            query_failure: Some("query not configured".into()),
            gates: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_submit_id(mut self, id: impl Into<String>) -> Self {
        self.submit = Canned::Ok(id.into());
        self
    }

    pub fn with_submit_failure(mut self, message: impl Into<String>) -> Self {
        self.submit = Canned::Fail(message.into());
        self
    }

    pub fn with_tables(mut self, payload: TablePayload) -> Self {
        self.tables = Canned::Ok(payload);
        self
    }

    pub fn with_tables_failure(mut self, message: impl Into<String>) -> Self {
        self.tables = Canned::Fail(message.into());
        self
    }

    /// `body` is the value of the outer `result` key.
    pub fn with_insights(mut self, body: serde_json::Value) -> Self {
        self.insights = Canned::Ok(body);
        self
    }

    pub fn with_insights_failure(mut self, message: impl Into<String>) -> Self {
        self.insights = Canned::Fail(message.into());
        self
    }

    /// Answers are handed out in order; the last one repeats.
    pub fn with_answers<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers = Mutex::new(answers.into_iter().map(Into::into).collect());
        self.query_failure = None;
        self
    }

    pub fn with_query_failure(mut self, message: impl Into<String>) -> Self {
        self.query_failure = Some(message.into());
        self
    }

    /// Hold calls to `endpoint` until a permit is added to `gate`.
    pub fn with_gate(mut self, endpoint: Endpoint, gate: Arc<Semaphore>) -> Self {
        self.gates.insert(endpoint, gate);
        self
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// `(document id, query)` pairs in the order they were received.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().clone()
    }

    async fn enter(&self, endpoint: Endpoint) {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        if let Some(gate) = self.gates.get(&endpoint) {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn answer<T: Clone>(endpoint: Endpoint, canned: &Canned<T>) -> Result<T> {
        match canned {
            Canned::Ok(value) => Ok(value.clone()),
            Canned::Fail(message) => Err(FinsightsError::network(endpoint.path(), message)),
        }
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisService {
    async fn submit(&self, _upload: &DocumentUpload) -> Result<SubmitResponse> {
        self.enter(Endpoint::Submit).await;
        Self::answer(Endpoint::Submit, &self.submit).map(|id| SubmitResponse { id })
    }

    async fn get_tables(&self, _id: &str) -> Result<TablesResponse> {
        self.enter(Endpoint::Tables).await;
        Self::answer(Endpoint::Tables, &self.tables).map(|result| TablesResponse { result })
    }

    async fn get_insights(&self, _id: &str) -> Result<InsightsResponse> {
        self.enter(Endpoint::Insights).await;
        Self::answer(Endpoint::Insights, &self.insights).map(|result| InsightsResponse { result })
    }

    async fn query(&self, id: &str, query: &str) -> Result<QueryResponse> {
        self.enter(Endpoint::Query).await;
        self.queries.lock().push((id.to_string(), query.to_string()));
        if let Some(message) = &self.query_failure {
            return Err(FinsightsError::network(Endpoint::Query.path(), message));
        }
        let mut answers = self.answers.lock();
        let result = if answers.len() > 1 {
            answers.remove(0)
        } else {
            answers.first().cloned().unwrap_or_default()
        };
        Ok(QueryResponse {
            result,
            source_documents: Vec::new(),
        })
    }
}
