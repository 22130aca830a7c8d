//! Domain entities for MouseShare.
//!
//! Pure value types with no infrastructure dependencies: they can be compiled
//! and tested on any platform without a network or a touch screen.
//!
//! - [`endpoint`] – the desktop host address typed by the user.
//! - [`pairing`] – the out-of-band pairing payload carried by the host's QR code.
//! - [`cursor`] – the last known pointer position on this device.
//! - [`activity`] – the bounded, user-facing activity log.

pub mod activity;
pub mod cursor;
pub mod endpoint;
pub mod pairing;
