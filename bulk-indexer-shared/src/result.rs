//! Outcome counters of an indexing session.

use serde::{Deserialize, Serialize};

/// Aggregate counters for one indexing session.
///
/// `success` never exceeds `total`. An empty session is a success with a
/// ratio of `1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingResult {
    total: u64,
    success: u64,
}

impl IndexingResult {
    /// Build a result from raw counters, clamping `success` to `total`.
    pub fn new(total: u64, success: u64) -> Self {
        Self {
            total,
            success: success.min(total),
        }
    }

    /// Result of a session that submitted nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Result of a session in which every one of `total` requests failed.
    pub fn failed(total: u64) -> Self {
        Self::new(total, 0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn success(&self) -> u64 {
        self.success
    }

    pub fn failures(&self) -> u64 {
        self.total - self.success
    }

    pub fn success_ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.success as f64 / self.total as f64
        }
    }

    /// True when every submitted request was confirmed.
    pub fn is_success(&self) -> bool {
        self.total == self.success
    }

    /// Fold another session's counters into this one.
    pub fn add(&mut self, other: &IndexingResult) -> &mut Self {
        self.total += other.total;
        self.success += other.success;
        self
    }
}
