//! Touch injector implementations.
//!
//! The native injection primitive (an accessibility service on Android) is
//! outside this crate.  What lives here:
//!
//! - [`DisabledInjector`] – used when injection permission is missing.  The
//!   dispatcher sees `is_enabled() == false` and skips every call.
//! - [`TracingInjector`] – logs each injection instead of performing it.
//!   The CLI uses it so a desktop host can be exercised without a device.
//! - [`mock::MockInjector`] – records calls for tests.
//!
//! [`select_injector`] picks between the first two at startup.

use std::sync::Arc;

use crate::application::dispatch_input::TouchInjector;

pub mod disabled;
pub mod mock;
pub mod tracing_injector;

pub use disabled::DisabledInjector;
pub use tracing_injector::TracingInjector;

/// Returns the injector to use for this run.
pub fn select_injector(enabled: bool) -> Arc<dyn TouchInjector> {
    if enabled {
        Arc::new(TracingInjector::new())
    } else {
        Arc::new(DisabledInjector)
    }
}
