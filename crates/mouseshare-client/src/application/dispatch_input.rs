//! DispatchInputUseCase: turns host input messages into touch injection calls.
//!
//! This use case sits at the application layer and delegates to a
//! [`TouchInjector`] trait object for the actual injection.  Concrete
//! injectors live in the infrastructure layer.
//!
//! # Mapping
//!
//! | message    | effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `mouse`    | cursor ← (x, y); `move_to(x, y)`                          |
//! | `click`    | cursor ← (x, y); `click(x, y)` on `down`, nothing on `up` |
//! | `scroll`   | swipe from the cursor by (dx × 10, −dy × 50)              |
//! | `keyboard` | logged only                                               |
//! | `pong`     | nothing                                                   |
//!
//! Injection failures are reported in the returned [`DispatchReport`] and
//! never propagate as errors: a failed tap must not end the session.

use std::sync::Arc;

use mouseshare_core::{protocol::messages::ButtonAction, CursorPosition, InboundMessage};
use thiserror::Error;
use tracing::{debug, warn};

/// Horizontal swipe distance per unit of host `dx`.
pub const SCROLL_X_FACTOR: f64 = 10.0;

/// Vertical swipe distance per unit of host `dy`.  Positive `dy` ("wheel up")
/// swipes towards the top of the screen.
pub const SCROLL_Y_FACTOR: f64 = 50.0;

/// Error type for touch injection operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectionError {
    #[error("touch injection failed: {0}")]
    Platform(String),
    #[error("touch injection is not available on this device")]
    Disabled,
}

/// Platform-agnostic touch injection capability.
///
/// Coordinates are absolute device pixels.  Implementations must not block
/// for long; the session calls them inline while processing messages.
#[cfg_attr(test, mockall::automock)]
pub trait TouchInjector: Send + Sync {
    /// Whether the platform permission to inject input has been granted.
    fn is_enabled(&self) -> bool;

    /// Moves the pointer (or the accessibility focus) to (`x`, `y`).
    fn move_to(&self, x: f64, y: f64) -> Result<(), InjectionError>;

    /// Performs a single tap at (`x`, `y`).
    fn click(&self, x: f64, y: f64) -> Result<(), InjectionError>;

    /// Performs a straight swipe from the start point to the end point.
    fn gesture(
        &self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<(), InjectionError>;
}

/// What a dispatched message did, for the session to record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Lines for the user-visible activity log, in order.
    pub log_lines: Vec<String>,
    /// The new cursor position when the message moved it.
    pub cursor: Option<CursorPosition>,
}

impl DispatchReport {
    fn log(mut self, line: impl Into<String>) -> Self {
        self.log_lines.push(line.into());
        self
    }

    fn moved_to(mut self, cursor: CursorPosition) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Computes the swipe for a scroll of (`dx`, `dy`) starting at `start`.
///
/// Returns `(start, end)`.  A zero delta yields `start == end`.
pub fn scroll_gesture(start: CursorPosition, dx: f64, dy: f64) -> (CursorPosition, CursorPosition) {
    let end = start.offset(dx * SCROLL_X_FACTOR, -dy * SCROLL_Y_FACTOR);
    (start, end)
}

/// The Dispatch Input use case.
///
/// Owns the cursor position.  Receives decoded host messages while the
/// session is connected and forwards them to the injector.
pub struct InputDispatcher {
    injector: Arc<dyn TouchInjector>,
    cursor: Option<CursorPosition>,
    viewport: (u32, u32),
}

impl InputDispatcher {
    /// Creates a dispatcher for a screen of `width` × `height` pixels.
    pub fn new(injector: Arc<dyn TouchInjector>, width: u32, height: u32) -> Self {
        Self {
            injector,
            cursor: None,
            viewport: (width, height),
        }
    }

    /// Last absolute position reported by the host, if any.
    pub fn cursor(&self) -> Option<CursorPosition> {
        self.cursor
    }

    /// Updates the screen size used as the scroll fallback origin.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Whether the underlying injector can inject.
    pub fn injection_enabled(&self) -> bool {
        self.injector.is_enabled()
    }

    /// Applies one host message.
    pub fn dispatch(&mut self, msg: &InboundMessage) -> DispatchReport {
        match msg {
            InboundMessage::Mouse { x, y } => self.handle_mouse(*x, *y),
            InboundMessage::Click { x, y, action, .. } => self.handle_click(*x, *y, *action),
            InboundMessage::Scroll { dx, dy } => self.handle_scroll(*dx, *dy),
            InboundMessage::Keyboard { key, action } => {
                debug!(%key, %action, "keyboard event (not injected)");
                DispatchReport::default().log(format!("Key {action}: {key}"))
            }
            InboundMessage::Pong => DispatchReport::default(),
            InboundMessage::PairingResponse { status } => {
                debug!(%status, "ignoring pairing_response on a paired session");
                DispatchReport::default()
            }
            InboundMessage::Unknown { kind } => {
                DispatchReport::default().log(format!("Unknown message type: {kind}"))
            }
        }
    }

    fn handle_mouse(&mut self, x: f64, y: f64) -> DispatchReport {
        let cursor = CursorPosition::new(x, y);
        self.cursor = Some(cursor);

        if self.injector.is_enabled() {
            // Pointer traffic is high-frequency; keep failures out of the activity log.
            if let Err(e) = self.injector.move_to(x, y) {
                debug!("move_to({x}, {y}) failed: {e}");
            }
        }

        DispatchReport::default().moved_to(cursor)
    }

    fn handle_click(&mut self, x: f64, y: f64, action: ButtonAction) -> DispatchReport {
        let cursor = CursorPosition::new(x, y);
        self.cursor = Some(cursor);
        let mut report = DispatchReport::default()
            .log(format!("Click at ({x}, {y}) - {action}"))
            .moved_to(cursor);

        if action != ButtonAction::Down {
            return report;
        }

        if !self.injector.is_enabled() {
            return report.log("Touch injection disabled; click not performed");
        }

        if let Err(e) = self.injector.click(x, y) {
            warn!("click at ({x}, {y}) failed: {e}");
            report = report.log(format!("Click failed: {e}"));
        }
        report
    }

    fn handle_scroll(&mut self, dx: f64, dy: f64) -> DispatchReport {
        let origin = self
            .cursor
            .unwrap_or_else(|| CursorPosition::center_of(self.viewport.0, self.viewport.1));
        let (start, end) = scroll_gesture(origin, dx, dy);
        let mut report = DispatchReport::default().log(format!("Scroll: dx={dx}, dy={dy}"));

        if self.injector.is_enabled() {
            if let Err(e) = self.injector.gesture(start.x, start.y, end.x, end.y) {
                warn!("scroll gesture failed: {e}");
                report = report.log(format!("Scroll failed: {e}"));
            }
        }
        report
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
