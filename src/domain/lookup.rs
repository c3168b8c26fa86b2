// ==========================================
// Manifest Registry - Reference Entities
// ==========================================
// The three lookup entity sets entries are reconciled
// against. Natural keys: container type by model string,
// flag by name, ship by name (case-insensitive).
// Auto-creation never overwrites existing metadata.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerType {
    pub id: i64,
    /// Natural key, e.g. "MSKU20GP".
    pub container_model: String,
    pub type_code: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: i64,
    pub name: String,
    pub shipping_line: String,
    pub flag_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// SweepReport - batch reconciliation result
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub container_types_created: usize,
    pub flags_created: usize,
    pub ships_created: usize,
    pub entries_linked: usize,
}
