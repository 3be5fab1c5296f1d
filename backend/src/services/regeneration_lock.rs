//! Per-farmer calendar regeneration lock
//!
//! Two regenerations for the same farmer must not interleave, otherwise the
//! later write could be based on a calendar the earlier one already replaced.
//! A second request while one is running is rejected, not queued.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Farmers with a regeneration currently running
#[derive(Clone, Default)]
pub struct RegenerationLocks {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

/// Held for the duration of one regeneration; releases the farmer on drop
#[must_use]
pub struct RegenerationGuard {
    farmer_id: Uuid,
    active: Arc<Mutex<HashSet<Uuid>>>,
}

impl RegenerationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the lock for `farmer_id`, failing if it is already held
    pub fn acquire(&self, farmer_id: Uuid) -> AppResult<RegenerationGuard> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(farmer_id) {
            tracing::warn!(%farmer_id, "Regeneration already in progress");
            return Err(AppError::RegenerationInProgress(farmer_id));
        }
        tracing::debug!(%farmer_id, "Acquired regeneration lock");

        Ok(RegenerationGuard {
            farmer_id,
            active: self.active.clone(),
        })
    }

    pub fn is_held(&self, farmer_id: Uuid) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&farmer_id)
    }

    pub fn in_flight(&self) -> usize {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for RegenerationGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.farmer_id);
        tracing::debug!(farmer_id = %self.farmer_id, "Released regeneration lock");
    }
}
