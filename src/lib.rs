//! Finsights client.
//!
//! Upload a bank statement, then explore it on the conversation page: the
//! original document, the extracted transaction tables, an AI insights
//! dashboard and a chat, all backed by the remote analysis service.

pub mod adapters;
pub mod api;
pub mod config;
pub mod conversation;
pub mod document;
pub mod error;

pub use config::Config;
pub use error::{FinsightsError, Result};
