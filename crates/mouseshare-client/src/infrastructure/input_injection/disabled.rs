//! Injector used when the platform has not granted injection permission.

use crate::application::dispatch_input::{InjectionError, TouchInjector};

/// Refuses every injection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledInjector;

impl TouchInjector for DisabledInjector {
    fn is_enabled(&self) -> bool {
        false
    }

    fn move_to(&self, _x: f64, _y: f64) -> Result<(), InjectionError> {
        Err(InjectionError::Disabled)
    }

    fn click(&self, _x: f64, _y: f64) -> Result<(), InjectionError> {
        Err(InjectionError::Disabled)
    }

    fn gesture(&self, _: f64, _: f64, _: f64, _: f64) -> Result<(), InjectionError> {
        Err(InjectionError::Disabled)
    }
}
