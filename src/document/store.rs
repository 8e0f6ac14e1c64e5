use std::sync::Arc;

use parking_lot::RwLock;

use super::durable::{DurableStore, MemoryStore};
use super::schema::UploadRecord;
use crate::error::{FinsightsError, Result};

/// Key the current upload record is persisted under.
pub const RECORD_KEY: &str = "file";

/// The current upload record, shared by every view of the application.
///
/// Cloning the store hands out another handle to the same record. Writes go
/// to durable storage before they become visible in memory, so a reload can
/// always recover the latest committed record.
#[derive(Clone)]
pub struct UploadStateStore {
    current: Arc<RwLock<Option<UploadRecord>>>,
    durable: Arc<dyn DurableStore>,
}

impl UploadStateStore {
    pub fn new(durable: Arc<dyn DurableStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            durable,
        }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load the record from durable storage if memory holds none.
    ///
    /// A missing, unparsable or tampered payload means "no record"; it is
    /// logged, never reported as an error, and a bad payload is dropped from
    /// durable storage.
    pub fn hydrate(&self) -> Option<UploadRecord> {
        let mut current = self.current.write();
        if let Some(record) = current.as_ref() {
            return Some(record.clone());
        }

        let raw = match self.durable.load(RECORD_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no persisted upload record");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted upload record");
                return None;
            }
        };

        let record = match Self::decode(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt upload record");
                if let Err(e) = self.durable.remove(RECORD_KEY) {
                    tracing::warn!(error = %e, "failed to drop corrupt upload record");
                }
                return None;
            }
        };

        tracing::info!(name = %record.name, id = ?record.id, "upload record restored");
        *current = Some(record.clone());
        Some(record)
    }

    fn decode(raw: &str) -> Result<UploadRecord> {
        let record: UploadRecord = serde_json::from_str(raw)?;
        record.verify_digest()?;
        Ok(record)
    }

    /// Current record, falling back to durable storage when memory is empty.
    pub fn get(&self) -> Option<UploadRecord> {
        if let Some(record) = self.current.read().as_ref() {
            return Some(record.clone());
        }
        self.hydrate()
    }

    /// Persist `record` and make it current. On a storage failure the
    /// previous record stays current.
    pub fn set(&self, record: UploadRecord) -> Result<()> {
        let payload = serde_json::to_string(&record)
            .map_err(|e| FinsightsError::Storage(format!("serialize upload record: {e}")))?;
        let mut current = self.current.write();
        self.durable.save(RECORD_KEY, &payload)?;
        *current = Some(record);
        Ok(())
    }

    /// Apply `f` to the current record and persist the result.
    pub fn update<F>(&self, f: F) -> Result<Option<UploadRecord>>
    where
        F: FnOnce(&mut UploadRecord),
    {
        let Some(mut record) = self.get() else {
            return Ok(None);
        };
        f(&mut record);
        self.set(record.clone())?;
        Ok(Some(record))
    }

    /// Forget the record in memory and on disk.
    pub fn clear(&self) -> Result<()> {
        let mut current = self.current.write();
        self.durable.remove(RECORD_KEY)?;
        *current = None;
        Ok(())
    }

    /// Drop the in-memory record only, as a full reload would.
    pub fn reset(&self) {
        *self.current.write() = None;
    }
}
