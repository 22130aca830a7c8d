//! Cursor position on the device screen.

use serde::{Deserialize, Serialize};

/// The last absolute pointer position reported by the host, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

impl CursorPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centre of a `width` × `height` screen.
    pub fn center_of(width: u32, height: u32) -> Self {
        Self::new(f64::from(width) / 2.0, f64::from(height) / 2.0)
    }

    /// Returns this position moved by (`dx`, `dy`).
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_of_halves_dimensions() {
        assert_eq!(CursorPosition::center_of(1080, 1920), CursorPosition::new(540.0, 960.0));
    }

    #[test]
    fn test_center_of_odd_dimensions_keeps_fraction() {
        assert_eq!(CursorPosition::center_of(3, 5), CursorPosition::new(1.5, 2.5));
    }

    #[test]
    fn test_offset_adds_deltas() {
        let p = CursorPosition::new(10.0, 20.0).offset(-5.0, 50.0);
        assert_eq!(p, CursorPosition::new(5.0, 70.0));
    }
}
