// ==========================================
// Manifest Registry - Partition (registry year)
// ==========================================
// A yearly bucket isolating entries and their ordinal
// sequence. At most one partition is active at a time;
// entries without an explicit partition attach to the
// active one, else the most recent year.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    pub id: i64,
    pub year: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "registry {}", self.year)
    }
}
