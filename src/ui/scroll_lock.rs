//! Reference-counted scroll lock shared by nested modals

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type LockObserver = Arc<dyn Fn(bool) + Send + Sync>;

/// Page-wide scroll lock.
///
/// Each open modal holds a [`ScrollLockGuard`]. The page stays locked while
/// any guard is alive, so closing an inner modal never unlocks the page under
/// an outer one. The observer is told about `locked` transitions only.
#[derive(Clone, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
    observer: Option<LockObserver>,
}

impl std::fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.holders())
            .finish()
    }
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `observer(true)` when the first guard is taken and
    /// `observer(false)` when the last one is released
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn acquire(&self) -> ScrollLockGuard {
        if self.holders.fetch_add(1, Ordering::AcqRel) == 0 {
            log::debug!("Scroll lock engaged");
            self.notify(true);
        }
        ScrollLockGuard { lock: self.clone() }
    }

    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }

    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::Acquire)
    }

    fn release(&self) {
        if self.holders.fetch_sub(1, Ordering::AcqRel) == 1 {
            log::debug!("Scroll lock released");
            self.notify(false);
        }
    }

    fn notify(&self, locked: bool) {
        if let Some(observer) = &self.observer {
            observer(locked);
        }
    }
}

/// Holds the page locked until dropped
#[derive(Debug)]
pub struct ScrollLockGuard {
    lock: ScrollLock,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
