//! Run cancellation state.
//!
//! A `Cancellation` is shared by the snapshot workers of one run:
//! - tripped by Ctrl+C
//! - tripped by the first fatal error when failures are not collected
//!
//! Workers check it before issuing a request; requests already in flight
//! are allowed to finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation signal for a generation run.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. No new fetches are issued afterwards.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested
    ///
    /// Uses Relaxed ordering - worst case a worker issues one more request
    /// before observing the flag
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The first Ctrl+C trips `cancel` so in-flight snapshots drain and the
/// summary is still printed. A second Ctrl+C exits immediately.
pub fn setup_shutdown_handler(cancel: Cancellation) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            std::process::exit(130);
        }
        crate::log!("warn"; "interrupted, letting in-flight requests finish...");
        cancel.cancel();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
