//! Domain events that make indices stale.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why indices must be updated after a domain mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    EntityCreation,
    EntityDeletion,
    EntityKeyUpdate,
    EntityTagsUpdate,
    PermissionChange,
    MeasureChange,
    BranchDeletion,
}

impl Cause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cause::EntityCreation => "entity_creation",
            Cause::EntityDeletion => "entity_deletion",
            Cause::EntityKeyUpdate => "entity_key_update",
            Cause::EntityTagsUpdate => "entity_tags_update",
            Cause::PermissionChange => "permission_change",
            Cause::MeasureChange => "measure_change",
            Cause::BranchDeletion => "branch_deletion",
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
