//! # mouseshare-core
//!
//! Shared library for MouseShare containing the JSON wire protocol, the
//! stream codec, and the small domain types the pairing session is built on.
//!
//! This crate has zero dependencies on OS APIs, UI frameworks, or network
//! sockets.
//!
//! # Architecture overview (for beginners)
//!
//! MouseShare lets a desktop host drive a mobile device: the desktop captures
//! pointer and keyboard intent and streams it over the local network, and the
//! device replays it as synthetic touches.
//!
//! - **`protocol`** – The JSON messages exchanged with the host and the codec
//!   that turns a TCP byte stream into typed messages (and back).
//!
//! - **`domain`** – Pure value types with no I/O: the host endpoint, the
//!   out-of-band pairing payload (usually scanned from a QR code), the cursor
//!   position, and the bounded activity log shown to the user.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `mouseshare_core::Endpoint` instead of `mouseshare_core::domain::endpoint::Endpoint`.
pub use domain::activity::{ActivityLog, ActivityLogEntry, ACTIVITY_LOG_CAPACITY};
pub use domain::cursor::CursorPosition;
pub use domain::endpoint::{Endpoint, DEFAULT_PORT};
pub use domain::pairing::{PairingPayload, PairingPayloadError, PAIRING_APP_ID};
pub use protocol::codec::{decode_message, encode_message, DecodeError, FrameDecoder};
pub use protocol::messages::{InboundMessage, OutboundMessage};
