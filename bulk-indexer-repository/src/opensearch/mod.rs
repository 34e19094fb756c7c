//! OpenSearch backend of [`SearchEngineClient`](crate::interfaces::SearchEngineClient).
//!
//! Bulk bodies are built as newline-delimited JSON lines and responses are
//! paired back with their requests by position.

mod bulk_body;
mod client;

pub use client::OpenSearchClient;
