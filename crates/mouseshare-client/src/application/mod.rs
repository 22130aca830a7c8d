//! Application layer use cases for the client application.
//!
//! # What use cases does the client have?
//!
//! - **`session`** – The pairing session state machine.  Owns the transport
//!   link, drives the `pairing` → `pairing_response` → `screen_info`
//!   handshake, keeps the activity log, and reports every change to a
//!   [`session::SessionObserver`].  [`session::run_session`] drives it from a
//!   single tokio task.
//!
//! - **`dispatch_input`** – Turns host input messages into touch injection
//!   calls and tracks the cursor.  The actual injection is done by a
//!   [`dispatch_input::TouchInjector`] implementation that is injected at
//!   construction time.
//!
//! - **`transport`** – The connection contract the session is written
//!   against.  The TCP implementation is in `infrastructure::network`.

pub mod dispatch_input;
pub mod session;
pub mod transport;
