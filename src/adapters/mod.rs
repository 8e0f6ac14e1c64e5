//! Normalization of analysis service payloads into the shapes the panels
//! render.

pub mod insights;
pub mod tables;

pub use insights::{unwrap_insights, CategorySummary, Frequency, InsightsRecord, Trends};
pub use tables::{decode_tables, TableDataset};
