//! Protocol module containing message types and the JSON stream codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_message, encode_message, DecodeError, FrameDecoder};
pub use messages::*;
