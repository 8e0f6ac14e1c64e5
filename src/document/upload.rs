use std::path::Path;
use std::sync::Arc;

use super::identity::{build_record, compute_hash, SelectedFile};
use super::schema::UploadRecord;
use super::store::UploadStateStore;
use crate::api::{AnalysisService, DocumentUpload};
use crate::error::{FinsightsError, Result};

/// Landing-page flow: pick a statement, then hand it to the analysis service.
pub struct UploadFlow {
    store: UploadStateStore,
    service: Arc<dyn AnalysisService>,
}

impl UploadFlow {
    pub fn new(store: UploadStateStore, service: Arc<dyn AnalysisService>) -> Self {
        Self { store, service }
    }

    pub async fn select_path(&self, path: &Path) -> Result<UploadRecord> {
        let file = SelectedFile::read(path).await?;
        self.select(file)
    }

    /// Hash the file and make it the current, persisted record.
    pub fn select(&self, file: SelectedFile) -> Result<UploadRecord> {
        file.ensure_supported()?;
        let digest = compute_hash(&file.bytes);
        let record = build_record(&file, digest);
        self.store.set(record.clone())?;
        tracing::info!(
            name = %record.name,
            hash = %record.hash,
            size = record.size,
            "document selected"
        );
        Ok(record)
    }

    /// Submit the current record and attach the identity the service
    /// assigns. A record that already carries one is returned as is.
    pub async fn submit(&self) -> Result<UploadRecord> {
        let mut record = self.store.get().ok_or(FinsightsError::NoDocument)?;
        record.verify_digest()?;

        if record.has_identity() {
            tracing::info!(id = ?record.id, "document already submitted");
            return Ok(record);
        }

        let upload = DocumentUpload {
            filename: record.name.clone(),
            mime_type: record.mime_type.clone(),
            bytes: record.bytes()?,
        };
        let response = self.service.submit(&upload).await?;
        tracing::info!(id = %response.id, name = %record.name, "document submitted");

        record.attach_identity(response.id);
        self.store.set(record.clone())?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, MockAnalysisService};

    fn flow(mock: MockAnalysisService) -> (UploadFlow, UploadStateStore, Arc<MockAnalysisService>) {
        let store = UploadStateStore::in_memory();
        let mock = Arc::new(mock);
        (UploadFlow::new(store.clone(), mock.clone()), store, mock)
    }

    #[tokio::test]
    async fn select_then_submit_attaches_identity() {
        let (flow, store, mock) = flow(MockAnalysisService::new().with_submit_id("srv-42"));
        let selected = flow
            .select(SelectedFile::from_bytes("jan.pdf", b"%PDF jan".to_vec()))
            .unwrap();
        assert_eq!(store.get().unwrap().id, None);

        let submitted = flow.submit().await.unwrap();
        assert_eq!(submitted.id.as_deref(), Some("srv-42"));
        assert_eq!(submitted.hash, selected.hash);

        store.reset();
        assert_eq!(store.get().unwrap().id.as_deref(), Some("srv-42"));

        flow.submit().await.unwrap();
        assert_eq!(mock.calls(Endpoint::Submit), 1);
    }

    #[tokio::test]
    async fn failed_submission_keeps_record_unidentified() {
        let (flow, store, _mock) =
            flow(MockAnalysisService::new().with_submit_failure("status 502"));
        flow.select(SelectedFile::from_bytes("jan.pdf", b"%PDF".to_vec()))
            .unwrap();
        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, FinsightsError::Network { .. }));
        assert_eq!(store.get().unwrap().id, None);
    }

    #[tokio::test]
    async fn unsupported_or_missing_files_never_reach_the_service() {
        let (flow, store, mock) = flow(MockAnalysisService::new().with_submit_id("x"));
        let err = flow
            .select(SelectedFile::from_bytes("notes.txt", b"hi".to_vec()))
            .unwrap_err();
        assert!(matches!(err, FinsightsError::UnsupportedFile { .. }));
        assert_eq!(store.get(), None);

        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, FinsightsError::NoDocument));
        let err = flow
            .select_path(Path::new("/nonexistent/jan.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, FinsightsError::Read(_)));
        assert_eq!(mock.total_calls(), 0);
    }
}
