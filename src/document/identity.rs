use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Utc;
use regex::bytes::Regex;
use sha2::{Digest, Sha256};

use super::payload::encode_data_uri;
use super::schema::UploadRecord;
use crate::error::{FinsightsError, Result};

/// Only bank statements in PDF form are accepted for analysis.
pub const ACCEPTED_MIME_TYPE: &str = "application/pdf";

// `/Type /Page` dictionaries, excluding the `/Type /Pages` tree nodes.
static PAGE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Type\s*/Page\b").expect("page pattern is valid"));

// Flat `/Type /Pages` tree nodes and their `/Count`.
static PAGE_TREE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)<<[^<>]*/Type\s*/Pages\b[^<>]*>>").expect("page tree pattern is valid")
});
static PAGE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Count\s+(\d+)").expect("count pattern is valid"));

/// A file the user picked, read fully into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub path: Option<PathBuf>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FinsightsError::Read(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            bytes,
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            path: None,
            bytes,
        }
    }

    pub fn mime_type(&self) -> String {
        guess_mime_type(&self.name)
    }

    /// Reject anything that is not a PDF before it is hashed or stored.
    pub fn ensure_supported(&self) -> Result<()> {
        let mime_type = self.mime_type();
        if mime_type != ACCEPTED_MIME_TYPE {
            return Err(FinsightsError::UnsupportedFile {
                filename: self.name.clone(),
                mime_type,
            });
        }
        Ok(())
    }
}

/// SHA-256 of the raw bytes, lowercase hex. Names and metadata play no part.
pub fn compute_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Build the record for a freshly selected file. The server identity stays
/// empty until submission succeeds.
pub fn build_record(file: &SelectedFile, digest: String) -> UploadRecord {
    let mime_type = file.mime_type();
    UploadRecord {
        id: None,
        name: file.name.clone(),
        size: file.bytes.len() as u64,
        content: encode_data_uri(&file.bytes, &mime_type),
        mime_type,
        url: file
            .path
            .as_ref()
            .map(|p| format!("file://{}", p.display())),
        hash: digest,
        uploaded_at: Utc::now().to_rfc3339(),
    }
}

/// Number of pages in a PDF, as reported to the document panel. Never zero.
///
/// Page objects packed into compressed object streams are invisible to the
/// scan, so the largest `/Count` of an uncompressed page tree node also counts.
pub fn count_pages(bytes: &[u8]) -> u32 {
    let objects = u32::try_from(PAGE_OBJECT.find_iter(bytes).count()).unwrap_or(u32::MAX);
    let tree = PAGE_TREE
        .find_iter(bytes)
        .filter_map(|node| PAGE_COUNT.captures(node.as_bytes()))
        .filter_map(|caps| std::str::from_utf8(&caps[1]).ok()?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    objects.max(tree).max(1)
}

/// Guess MIME type from filename extension.
pub fn guess_mime_type(filename: &str) -> String {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
    .to_string()
}
