use std::sync::{Mutex, MutexGuard};

use tokio::runtime::Runtime;

/// Creates a lightweight single-threaded Tokio runtime.
///
/// Background threads each get their own current_thread runtime instead of
/// sharing a multi-threaded one, keeping the thread count flat.
///
/// Returns `Ok(Runtime)` if successful, or `Err(String)` with error message
pub fn create_runtime() -> Result<Runtime, String> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to create runtime: {}", e))
}

/// Safely locks a mutex with poisoning recovery.
///
/// If a previous holder panicked, the inner value is extracted anyway; the
/// data behind these locks (suggestion caches, UI-facing state) stays
/// usable after a panic.
///
/// Returns `Some(MutexGuard)` if successful, or `None` if lock failed
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> Option<MutexGuard<'a, T>> {
    match mutex.lock() {
        Ok(guard) => Some(guard),
        Err(poisoned) => {
            log::warn!("[{}] Mutex poisoned, recovering from panic", context);
            Some(poisoned.into_inner())
        }
    }
}
