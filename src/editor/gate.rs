//! Single-flight guard for save operations

use crate::api::ApiError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one save at a time.
///
/// A save holds a [`SaveTicket`] for its whole duration; the gate reopens when
/// the ticket is dropped, whether the save succeeded, failed or was cancelled.
#[derive(Debug, Clone, Default)]
pub struct SaveGate {
    busy: Arc<AtomicBool>,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or fail with [`ApiError::SaveInProgress`] if it is taken
    pub fn try_acquire(&self) -> Result<SaveTicket, ApiError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::SaveInProgress)?;

        Ok(SaveTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Whether a save is running; drives the disabled state of save controls
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct SaveTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for SaveTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
