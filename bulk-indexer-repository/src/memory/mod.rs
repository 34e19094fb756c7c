//! In-memory implementation of the recovery queue store.
//!
//! Keeps committed rows in process memory with the same transactional
//! visibility rules as a relational store. Useful for embedding and tests.

mod recovery_store;

pub use recovery_store::{MemoryRecoveryStore, MemoryStoreSession};
