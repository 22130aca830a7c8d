//! JSON message types for the MouseShare host protocol.
//!
//! The desktop host and the mobile client exchange small JSON objects over a
//! single TCP stream.  Every message carries a `"type"` field naming the
//! variant; all other fields sit next to it in the same object:
//!
//! ```json
//! {"type":"mouse","x":100,"y":200}
//! ```
//!
//! # Message flow
//!
//! ```text
//! Client → Host:  OutboundMessage  (pairing, screen_info)
//! Host   → Client: InboundMessage  (pairing_response, mouse, click, scroll,
//!                                   keyboard, pong)
//! ```
//!
//! The two directions use two distinct enums so it is a compile-time error to
//! send a host-only message from the client.
//!
//! # Optional fields
//!
//! Hosts in the wild omit fields they consider irrelevant (a `click` without
//! coordinates, a `scroll` with only `dy`).  Every inbound field therefore has
//! a serde default: numbers fall back to `0` and strings to `""`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire value of the `"type"` field for each inbound message kind.
pub mod kind {
    pub const PAIRING_RESPONSE: &str = "pairing_response";
    pub const MOUSE: &str = "mouse";
    pub const CLICK: &str = "click";
    pub const SCROLL: &str = "scroll";
    pub const KEYBOARD: &str = "keyboard";
    pub const PONG: &str = "pong";

    /// All inbound kinds this client understands.
    pub const KNOWN: [&str; 6] = [PAIRING_RESPONSE, MOUSE, CLICK, SCROLL, KEYBOARD, PONG];
}

/// The `status` value a host sends when the pairing code was accepted.
pub const PAIRING_STATUS_SUCCESS: &str = "success";

// ── Client → Host messages ────────────────────────────────────────────────────

/// All messages the client sends to the desktop host.
///
/// # Serde representation
///
/// ```json
/// {"type":"pairing","code":"123456"}
/// {"type":"screen_info","width":1080,"height":2400}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// First message after the TCP connection opens: the pairing code the
    /// user read off the desktop (or scanned from its QR code).
    Pairing {
        /// Short numeric secret shown by the host, usually six digits.
        code: String,
    },

    /// Sent once the host accepts the pairing code, so it can map its
    /// pointer space onto this device's screen.
    ScreenInfo {
        /// Screen width in device-independent pixels.
        width: u32,
        /// Screen height in device-independent pixels.
        height: u32,
    },
}

impl OutboundMessage {
    /// Wire name of this message's `"type"` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pairing { .. } => "pairing",
            Self::ScreenInfo { .. } => "screen_info",
        }
    }
}

// ── Host → Client messages ────────────────────────────────────────────────────

/// Press or release phase of a `click` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// The host button went down.  This is the phase that produces a tap.
    Down,
    /// The host button was released.
    Up,
    /// Missing or unrecognised action.
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Unknown => "unknown",
        })
    }
}

/// All messages the desktop host can send to the client.
///
/// Decoding goes through [`crate::protocol::codec::decode_message`], which
/// maps any `"type"` outside [`kind::KNOWN`] to [`InboundMessage::Unknown`]
/// instead of failing, so new host features never break an older client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// The host's verdict on the pairing code.
    PairingResponse {
        /// `"success"` when the code was accepted; anything else is a rejection.
        #[serde(default)]
        status: String,
    },

    /// Absolute pointer position in this device's coordinate space.
    Mouse {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },

    /// A button press or release at an absolute position.
    Click {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        action: ButtonAction,
        /// Host button name (`"left"`, `"right"`, ...).  Informational only.
        #[serde(default)]
        button: Option<String>,
    },

    /// Relative wheel movement; positive `dy` means "scroll up" on the host.
    Scroll {
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
    },

    /// A key event.  Key injection is not supported; these are only logged.
    Keyboard {
        #[serde(default)]
        key: String,
        #[serde(default)]
        action: String,
    },

    /// Liveness acknowledgment.
    Pong,

    /// A `"type"` this client does not know.  Never produced by serde directly.
    #[serde(skip)]
    Unknown {
        /// The unrecognised `"type"` value, kept for logging.
        kind: String,
    },
}

impl InboundMessage {
    /// Wire name of this message's `"type"` field.
    pub fn kind(&self) -> &str {
        match self {
            Self::PairingResponse { .. } => kind::PAIRING_RESPONSE,
            Self::Mouse { .. } => kind::MOUSE,
            Self::Click { .. } => kind::CLICK,
            Self::Scroll { .. } => kind::SCROLL,
            Self::Keyboard { .. } => kind::KEYBOARD,
            Self::Pong => kind::PONG,
            Self::Unknown { kind } => kind,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
