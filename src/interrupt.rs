//! Cooperative interrupt signaling.
//!
//! The Ctrl-C handler raises a process-wide flag. Long-running phases
//! (scroll rounds, variation rendering, website fetch batches) poll it,
//! finish their current unit, and return what they have, so the run can
//! still assemble and export the partial harvest before exiting.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Raise the interrupt flag. Returns true on the first request, false
/// once the flag was already set (a repeated interrupt).
pub fn request_interrupt() -> bool {
    !INTERRUPTED.swap(true, Ordering::SeqCst)
}

/// True once an interrupt has been requested.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

// The flag is process-global, so only a single test may touch it; the
// website-fetch interrupt test owns it and restores it when done.
#[cfg(test)]
pub(crate) fn clear_interrupt() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}
