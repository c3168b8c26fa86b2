// ==========================================
// Manifest Registry - Staging Store
// ==========================================
// Holds a parsed, transformed batch between preview and
// confirm, keyed by an opaque session handle. One pending
// batch per session: `put` is last-write-wins, `take` is an
// atomic check-and-clear so a confirm can never consume the
// same batch twice.
// ==========================================

use crate::domain::{ManualFields, StagedRow};
use crate::importer::error::ImportError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default time a staged batch stays claimable.
pub const DEFAULT_STAGING_TTL: Duration = Duration::from_secs(30 * 60);

/// A transformed batch awaiting operator confirmation.
#[derive(Debug, Clone)]
pub struct StagedBatch {
    pub rows: Vec<StagedRow>,
    pub manual: ManualFields,
    pub partition_id: i64,
    pub partition_year: i32,
}

pub struct StagingStore {
    ttl: Duration,
    inner: Mutex<HashMap<String, (Instant, StagedBatch)>>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_STAGING_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Stage a batch for a session, replacing any batch already
    /// pending for that session.
    pub fn put(&self, session: &str, batch: StagedBatch) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.insert(session.to_string(), (Instant::now(), batch)).is_some() {
            tracing::debug!(session, "replaced previously staged batch");
        }
    }

    /// Atomically remove and return the staged batch for a session.
    ///
    /// Absent and expired batches both report as a session-expired
    /// error; an expired batch is dropped on the way out.
    pub fn take(&self, session: &str) -> Result<StagedBatch, ImportError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.remove(session) {
            Some((staged_at, batch)) if staged_at.elapsed() <= self.ttl => Ok(batch),
            Some(_) => {
                tracing::debug!(session, "staged batch expired");
                Err(ImportError::SessionExpired)
            }
            None => Err(ImportError::SessionExpired),
        }
    }

    /// Drop a session's staged batch without consuming it.
    pub fn invalidate(&self, session: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.remove(session).is_some()
    }
}

impl Default for StagingStore {
    fn default() -> Self {
        Self::new()
    }
}
