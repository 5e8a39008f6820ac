pub mod prompts;
pub mod scroll_lock;

pub use scroll_lock::{ScrollLock, ScrollLockGuard};
