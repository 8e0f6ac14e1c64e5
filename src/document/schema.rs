use serde::{Deserialize, Serialize};

use super::identity::compute_hash;
use super::payload::decode_data_uri;
use crate::error::{FinsightsError, Result};

/// The uploaded statement as the client tracks it between pages and across
/// reloads.
///
/// `url` is a local preview reference and never leaves the process; every
/// other field is part of the durable payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Server identity, assigned by a successful submission.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub size: u64,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    /// Raw document bytes as a `data:<mime>;base64,` URI.
    pub content: String,
    #[serde(skip)]
    pub url: Option<String>,
    /// SHA-256 of the original bytes, lowercase hex.
    pub hash: String,
    #[serde(default)]
    pub uploaded_at: String,
}

fn default_mime_type() -> String {
    "application/pdf".to_string()
}

impl UploadRecord {
    pub fn has_identity(&self) -> bool {
        self.id.is_some()
    }

    /// Attach the identity returned by the analysis service.
    ///
    /// A record is identified once; later calls leave it untouched and
    /// return `false`.
    pub fn attach_identity(&mut self, id: impl Into<String>) -> bool {
        if self.id.is_some() {
            tracing::warn!(name = %self.name, "record already carries a server identity");
            return false;
        }
        self.id = Some(id.into());
        true
    }

    /// Decode the embedded payload back into the original bytes.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        decode_data_uri(&self.content)
    }

    /// Re-hash the embedded payload and compare with the stored digest.
    pub fn verify_digest(&self) -> Result<()> {
        let bytes = self
            .bytes()
            .map_err(|e| FinsightsError::Hash(format!("payload unreadable: {e}")))?;
        let actual = compute_hash(&bytes);
        if actual != self.hash {
            return Err(FinsightsError::Hash(format!(
                "digest mismatch for {}: stored {}, computed {}",
                self.name, self.hash, actual
            )));
        }
        Ok(())
    }

    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }

    /// Where the document panel should load the document from.
    pub fn preview_source(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.content)
    }
}
