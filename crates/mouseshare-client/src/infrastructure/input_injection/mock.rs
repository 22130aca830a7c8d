//! Mock touch injector for testing.
//!
//! # Why a mock injector?
//!
//! A real injector needs a device, a granted accessibility permission, and
//! a screen to tap on.  None of that is observable from Rust test code.
//!
//! `MockInjector` records each call in a `Mutex<Vec<...>>` so assertions can
//! inspect exactly what was injected and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let injector = Arc::new(MockInjector::new());
//! let (session, events) = Session::new(config, connector, injector.clone(), observer);
//! // ... drive the session ...
//! assert_eq!(*injector.moves.lock().unwrap(), vec![(100.0, 200.0)]);
//! ```
//!
//! # Flags
//!
//! - `should_fail` makes every call return `InjectionError::Platform`, to
//!   exercise the "failures are logged, never fatal" paths.
//! - `enabled` controls `is_enabled()`, to simulate a missing permission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::application::dispatch_input::{InjectionError, TouchInjector};

/// A swipe as passed to [`TouchInjector::gesture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedGesture {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

/// Records all calls without injecting anything.
#[derive(Debug)]
pub struct MockInjector {
    /// Each (x, y) passed to `move_to`.
    pub moves: Mutex<Vec<(f64, f64)>>,
    /// Each (x, y) passed to `click`.
    pub clicks: Mutex<Vec<(f64, f64)>>,
    /// Each swipe passed to `gesture`.
    pub gestures: Mutex<Vec<RecordedGesture>>,
    /// When `true`, every injection returns an error (and is still recorded).
    pub should_fail: AtomicBool,
    /// Value returned by `is_enabled`.
    pub enabled: AtomicBool,
}

impl Default for MockInjector {
    fn default() -> Self {
        Self {
            moves: Mutex::new(Vec::new()),
            clicks: Mutex::new(Vec::new()),
            gestures: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
        }
    }
}

impl MockInjector {
    /// Creates an enabled injector with empty records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an injector that reports `is_enabled() == false`.
    pub fn disabled() -> Self {
        let injector = Self::default();
        injector.enabled.store(false, Ordering::Relaxed);
        injector
    }

    /// Creates an enabled injector whose every call fails.
    pub fn failing() -> Self {
        let injector = Self::default();
        injector.should_fail.store(true, Ordering::Relaxed);
        injector
    }

    /// Total number of calls across all three operations.
    pub fn total_calls(&self) -> usize {
        self.moves.lock().map(|v| v.len()).unwrap_or(0)
            + self.clicks.lock().map(|v| v.len()).unwrap_or(0)
            + self.gestures.lock().map(|v| v.len()).unwrap_or(0)
    }

    fn outcome(&self) -> Result<(), InjectionError> {
        if self.should_fail.load(Ordering::Relaxed) {
            Err(InjectionError::Platform("mock failure".into()))
        } else {
            Ok(())
        }
    }
}

impl TouchInjector for MockInjector {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), InjectionError> {
        if let Ok(mut moves) = self.moves.lock() {
            moves.push((x, y));
        }
        self.outcome()
    }

    fn click(&self, x: f64, y: f64) -> Result<(), InjectionError> {
        if let Ok(mut clicks) = self.clicks.lock() {
            clicks.push((x, y));
        }
        self.outcome()
    }

    fn gesture(
        &self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<(), InjectionError> {
        if let Ok(mut gestures) = self.gestures.lock() {
            gestures.push(RecordedGesture {
                start_x,
                start_y,
                end_x,
                end_y,
            });
        }
        self.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls_in_order() {
        // Arrange
        let injector = MockInjector::new();

        // Act
        injector.move_to(1.0, 2.0).unwrap();
        injector.move_to(3.0, 4.0).unwrap();
        injector.click(3.0, 4.0).unwrap();

        // Assert
        assert_eq!(*injector.moves.lock().unwrap(), vec![(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(*injector.clicks.lock().unwrap(), vec![(3.0, 4.0)]);
        assert_eq!(injector.total_calls(), 3);
    }

    #[test]
    fn test_failing_mock_returns_platform_error() {
        let injector = MockInjector::failing();
        assert!(matches!(
            injector.click(0.0, 0.0),
            Err(InjectionError::Platform(_))
        ));
    }

    #[test]
    fn test_disabled_mock_reports_not_enabled() {
        assert!(!MockInjector::disabled().is_enabled());
        assert!(MockInjector::new().is_enabled());
    }
}
