//! Cancellation tokens for deferred work
//!
//! Everything runs on one thread, so a token is a shared `Cell` flag rather
//! than an atomic. Deferred work checks its token before touching the session.

use std::cell::Cell;
use std::rc::Rc;

/// Cancellation token for cooperative cancellation
///
/// Clones share the same flag: cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every clone of it. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Check if this token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
