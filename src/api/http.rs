use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    AnalysisService, DocumentRequest, DocumentUpload, Endpoint, InsightsResponse, QueryRequest,
    QueryResponse, SubmitResponse, TablesResponse,
};
use crate::error::{FinsightsError, Result};

/// Analysis service reached over HTTP.
pub struct HttpAnalysisService {
    client: Client,
    base_url: String,
}

impl HttpAnalysisService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FinsightsError::network("client", e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    async fn post_json<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint = endpoint.path(), "POST");
        let response = self
            .client
            .post(self.url(endpoint))
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| FinsightsError::network(endpoint.path(), e))?;
        Self::decode(endpoint, response).await
    }

    async fn decode<T: DeserializeOwned>(endpoint: Endpoint, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinsightsError::network(
                endpoint.path(),
                format!("status {status}: {body}"),
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| FinsightsError::Parse(format!("{}: {e}", endpoint.path())))
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn submit(&self, upload: &DocumentUpload) -> Result<SubmitResponse> {
        let endpoint = Endpoint::Submit;
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| FinsightsError::network(endpoint.path(), e))?;
        let form = Form::new().part("file", part);

        tracing::debug!(
            endpoint = endpoint.path(),
            filename = %upload.filename,
            bytes = upload.bytes.len(),
            "POST multipart"
        );
        let response = self
            .client
            .post(self.url(endpoint))
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| FinsightsError::network(endpoint.path(), e))?;
        Self::decode(endpoint, response).await
    }

    async fn get_tables(&self, id: &str) -> Result<TablesResponse> {
        self.post_json(Endpoint::Tables, &DocumentRequest { id })
            .await
    }

    async fn get_insights(&self, id: &str) -> Result<InsightsResponse> {
        self.post_json(Endpoint::Insights, &DocumentRequest { id })
            .await
    }

    async fn query(&self, id: &str, query: &str) -> Result<QueryResponse> {
        self.post_json(Endpoint::Query, &QueryRequest { id, query })
            .await
    }
}
