//! JSON codec for MouseShare protocol messages.
//!
//! Wire format: one JSON object per message.  Outbound messages are written as
//! compact JSON followed by `\n`.  Inbound messages may arrive
//! newline-delimited, back-to-back (`{..}{..}`), or one bare object per TCP
//! read; [`FrameDecoder`] accepts all three.
//!
//! # Why a buffer is needed
//!
//! TCP is a stream protocol.  A single read may return half a message or
//! several messages at once.  [`FrameDecoder`] accumulates bytes and lets
//! `serde_json`'s stream deserializer find object boundaries; an incomplete
//! trailing object stays in the buffer until the rest arrives.
//!
//! # Malformed input
//!
//! A malformed payload never poisons the stream: the decoder reports a
//! [`DecodeError`] for it, drops the offending bytes up to the next newline
//! (or the whole buffer if there is none), and carries on.

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::protocol::messages::{kind, InboundMessage, OutboundMessage};

/// Largest number of bytes buffered while waiting for a message to complete.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Errors that can occur while decoding inbound bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not valid JSON.
    #[error("malformed JSON payload: {0}")]
    Malformed(String),

    /// The payload is JSON but has no string `"type"` field.
    #[error("message has no \"type\" field")]
    MissingType,

    /// A known message type carried fields of the wrong shape.
    #[error("invalid fields for {kind} message: {reason}")]
    InvalidFields { kind: String, reason: String },

    /// The buffer grew past [`MAX_FRAME_LEN`] without completing a message.
    #[error("frame exceeds {limit} bytes without a complete message")]
    FrameTooLarge { limit: usize },
}

/// Error returned when an outbound message cannot be serialized.
#[derive(Debug, Error)]
#[error("failed to encode {kind} message: {source}")]
pub struct EncodeError {
    pub kind: &'static str,
    #[source]
    pub source: serde_json::Error,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`OutboundMessage`] as compact JSON terminated by `\n`.
///
/// The `"type"` field is always written first, so the output is byte-for-byte
/// deterministic for a given message.
///
/// # Errors
///
/// Returns [`EncodeError`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use mouseshare_core::protocol::{encode_message, OutboundMessage};
///
/// let bytes = encode_message(&OutboundMessage::Pairing { code: "123456".into() }).unwrap();
/// assert_eq!(bytes, b"{\"type\":\"pairing\",\"code\":\"123456\"}\n");
/// ```
pub fn encode_message(msg: &OutboundMessage) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = serde_json::to_vec(msg).map_err(|source| EncodeError {
        kind: msg.kind(),
        source,
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes exactly one self-contained message from `bytes`.
///
/// Leading and trailing whitespace is allowed.  A `"type"` this client does
/// not know decodes to [`InboundMessage::Unknown`] rather than an error.
///
/// # Errors
///
/// Returns [`DecodeError`] if the bytes are not one JSON object with a string
/// `"type"` field, or if a known type has fields of the wrong shape.
///
/// # Examples
///
/// ```rust
/// use mouseshare_core::protocol::{decode_message, InboundMessage};
///
/// let msg = decode_message(br#"{"type":"mouse","x":10,"y":20}"#).unwrap();
/// assert_eq!(msg, InboundMessage::Mouse { x: 10.0, y: 20.0 });
/// ```
pub fn decode_message(bytes: &[u8]) -> Result<InboundMessage, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    decode_value(value)
}

fn decode_value(value: Value) -> Result<InboundMessage, DecodeError> {
    let kind = match value.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(DecodeError::MissingType),
    };

    if !kind::KNOWN.contains(&kind.as_str()) {
        return Ok(InboundMessage::Unknown { kind });
    }

    serde_json::from_value(value).map_err(|e| DecodeError::InvalidFields {
        kind,
        reason: e.to_string(),
    })
}

// ── Streaming decoder ─────────────────────────────────────────────────────────

/// Turns a stream of raw byte chunks into decoded inbound messages.
///
/// One decoder belongs to one connection; call [`FrameDecoder::reset`] when
/// the connection is replaced so stale bytes never leak into the next session.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every message that is now complete, in
    /// arrival order.  Malformed payloads appear as `Err` entries.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<InboundMessage, DecodeError>> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();

        loop {
            match self.buf.iter().position(|b| !b.is_ascii_whitespace()) {
                Some(start) => {
                    self.buf.drain(..start);
                }
                None => {
                    self.buf.clear();
                    break;
                }
            }

            let (next, consumed) = {
                let mut stream = serde_json::Deserializer::from_slice(&self.buf).into_iter::<Value>();
                let next = stream.next();
                (next, stream.byte_offset())
            };

            match next {
                Some(Ok(value)) => {
                    self.buf.drain(..consumed);
                    out.push(decode_value(value));
                }
                Some(Err(e)) if e.is_eof() => {
                    if self.buf.len() > MAX_FRAME_LEN {
                        self.buf.clear();
                        out.push(Err(DecodeError::FrameTooLarge {
                            limit: MAX_FRAME_LEN,
                        }));
                    } else {
                        trace!(buffered = self.buf.len(), "waiting for the rest of a message");
                    }
                    break;
                }
                Some(Err(e)) => {
                    self.discard_line();
                    out.push(Err(DecodeError::Malformed(e.to_string())));
                }
                None => break,
            }
        }

        out
    }

    /// Number of bytes held back waiting for a message to complete.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Drops any partially received message.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Drops bytes through the next newline, or everything if there is none.
    fn discard_line(&mut self) {
        match self.buf.iter().position(|&b| b == b'\n') {
            Some(nl) => {
                self.buf.drain(..=nl);
            }
            None => self.buf.clear(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
