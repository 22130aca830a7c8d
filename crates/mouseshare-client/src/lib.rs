//! mouseshare-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does mouseshare-client do? (for beginners)
//!
//! The *client* is the mobile device being driven by a desktop host.  The
//! desktop shows a pairing code (and a QR code carrying the same details);
//! once the client proves it knows the code, the desktop streams pointer
//! activity and the client replays it as synthetic touches.
//!
//! The client:
//!
//! 1. Opens a TCP connection to the host (default port 5555).
//! 2. Sends `pairing` with the six-digit code and waits for
//!    `pairing_response`.
//! 3. On success, reports its screen size with `screen_info`.
//! 4. Receives `mouse`, `click`, `scroll`, and `keyboard` messages and turns
//!    them into moves, taps, and swipe gestures through a [`TouchInjector`].
//!
//! [`TouchInjector`]: application::dispatch_input::TouchInjector

/// Application layer: the session state machine and the input dispatcher.
pub mod application;

/// Infrastructure layer: TCP transport, touch injectors, UI bridge, and config.
pub mod infrastructure;
