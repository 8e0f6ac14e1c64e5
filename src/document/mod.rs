//! Uploaded statement: content identity, durable record and the upload flow.

pub mod durable;
pub mod identity;
pub mod payload;
pub mod schema;
pub mod storage;
pub mod store;
pub mod upload;

pub use durable::{DurableStore, MemoryStore, SqliteStore};
pub use identity::{build_record, compute_hash, count_pages, SelectedFile};
pub use schema::UploadRecord;
pub use storage::PreviewStorage;
pub use store::UploadStateStore;
pub use upload::UploadFlow;
