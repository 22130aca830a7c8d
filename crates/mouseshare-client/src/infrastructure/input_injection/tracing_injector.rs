//! Injector that logs instead of injecting.
//!
//! Moves are logged at `trace` (they arrive at pointer rate); taps and
//! swipes at `info`.  Run with `RUST_LOG=mouseshare_client=trace` to see
//! every move.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, trace};

use crate::application::dispatch_input::{InjectionError, TouchInjector};

/// Logs every injection through `tracing` and counts them.
#[derive(Debug, Default)]
pub struct TracingInjector {
    injected: AtomicU64,
}

impl TracingInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of injections performed so far.
    pub fn injected(&self) -> u64 {
        self.injected.load(Ordering::Relaxed)
    }

    fn count(&self) {
        self.injected.fetch_add(1, Ordering::Relaxed);
    }
}

impl TouchInjector for TracingInjector {
    fn is_enabled(&self) -> bool {
        true
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), InjectionError> {
        trace!(x, y, "inject move");
        self.count();
        Ok(())
    }

    fn click(&self, x: f64, y: f64) -> Result<(), InjectionError> {
        info!(x, y, "inject tap");
        self.count();
        Ok(())
    }

    fn gesture(
        &self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<(), InjectionError> {
        info!(start_x, start_y, end_x, end_y, "inject swipe");
        self.count();
        Ok(())
    }
}
