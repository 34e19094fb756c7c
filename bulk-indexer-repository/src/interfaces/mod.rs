//! Interface definitions for the external collaborators of the pipeline.
//!
//! `SearchEngineClient` abstracts the search engine, `RecoveryQueueStore`
//! abstracts the durable store holding recovery-queue rows. Both allow
//! dependency injection and swappable backends.

mod recovery_queue_store;
mod search_engine_client;

pub use recovery_queue_store::{RecoveryQueueStore, StoreSession};
pub use search_engine_client::SearchEngineClient;
