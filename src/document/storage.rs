use std::path::PathBuf;

use tokio::fs;

use super::identity::guess_mime_type;
use super::schema::UploadRecord;
use crate::error::{FinsightsError, Result};

/// Materializes embedded document payloads as local files so the document
/// panel has something to open after a reload.
pub struct PreviewStorage {
    base_dir: PathBuf,
}

impl PreviewStorage {
    pub fn new(base_dir: &str) -> Self {
        let expanded = shellexpand::tilde(base_dir).to_string();
        Self {
            base_dir: PathBuf::from(expanded).join("previews"),
        }
    }

    /// Write the record's bytes to `<base>/previews/<hash>.<ext>` unless the
    /// file is already there, and return its path.
    pub async fn materialize(&self, record: &UploadRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| FinsightsError::Storage(format!("create preview dir: {e}")))?;

        let ext = match guess_mime_type(&record.name).as_str() {
            "application/octet-stream" => "bin".to_string(),
            _ => record.name.rsplit('.').next().unwrap_or("bin").to_lowercase(),
        };
        let abs_path = self.base_dir.join(format!("{}.{}", record.hash, ext));

        if fs::try_exists(&abs_path).await.unwrap_or(false) {
            return Ok(abs_path);
        }

        let bytes = record.bytes()?;
        fs::write(&abs_path, bytes)
            .await
            .map_err(|e| FinsightsError::Storage(format!("write preview: {e}")))?;
        tracing::debug!(path = %abs_path.display(), "preview materialized");
        Ok(abs_path)
    }

    /// Attach a preview reference to a record that lost it across a reload.
    pub async fn restore_url(&self, record: &mut UploadRecord) -> Result<()> {
        if record.url.is_some() {
            return Ok(());
        }
        let path = self.materialize(record).await?;
        record.url = Some(format!("file://{}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::identity::{build_record, compute_hash, SelectedFile};

    #[tokio::test]
    async fn restores_preview_from_embedded_payload() {
        let dir = tempfile::tempdir().unwrap();
        let previews = PreviewStorage::new(dir.path().to_str().unwrap());

        let file = SelectedFile::from_bytes("statement.pdf", b"%PDF-1.4 body".to_vec());
        let mut record = build_record(&file, compute_hash(&file.bytes));
        assert_eq!(record.url, None);

        previews.restore_url(&mut record).await.unwrap();
        let url = record.url.clone().unwrap();
        let path = url.strip_prefix("file://").unwrap();
        assert!(path.ends_with(&format!("{}.pdf", record.hash)));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4 body");
    }
}
