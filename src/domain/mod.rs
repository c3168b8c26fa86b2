// ==========================================
// Manifest Registry - Domain Layer
// ==========================================
// Entities and closed types only; no data access, no
// pipeline logic.
// ==========================================

pub mod entry;
pub mod lookup;
pub mod partition;
pub mod template;
pub mod types;

pub use entry::{
    derive_container_model, parse_registration_date, ManifestEntry, ManualFields,
    ManualFieldsInput, StagedRow,
};
pub use lookup::{ContainerType, Flag, Ship, SweepReport};
pub use partition::Partition;
pub use template::ImportTemplate;
pub use types::{EntryField, OperationType, SheetFormat};
