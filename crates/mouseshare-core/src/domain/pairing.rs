//! Out-of-band pairing payload.
//!
//! The desktop host displays a QR code encoding a small JSON object:
//!
//! ```json
//! {"ip":"192.168.1.10","port":"5555","code":"123456","app":"MouseShare"}
//! ```
//!
//! The camera/QR decoder lives outside this crate and hands over the decoded
//! text; [`PairingPayload::parse`] validates it and turns it into the endpoint
//! string and pairing code the session needs.  Some host builds emit `port`
//! and `code` as JSON numbers, so both shapes are accepted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::endpoint::{Endpoint, EndpointError};

/// Value of the `app` field that identifies a MouseShare QR code.
pub const PAIRING_APP_ID: &str = "MouseShare";

/// Reasons a scanned payload is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingPayloadError {
    /// The text is not a JSON object of the expected shape.
    #[error("invalid pairing payload: {0}")]
    Malformed(String),

    /// The payload belongs to some other application.
    #[error("payload is for {0:?}, not MouseShare")]
    WrongApp(String),

    /// A required field is missing or empty.
    #[error("pairing payload field {0:?} is empty")]
    MissingField(&'static str),
}

/// Connection details scanned from the host's QR code or typed by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub ip: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub app: String,
}

impl PairingPayload {
    /// Parses and validates the decoded QR text.
    ///
    /// # Errors
    ///
    /// Returns [`PairingPayloadError`] if the text is not JSON, is not a
    /// MouseShare payload, or lacks `ip`, `port`, or `code`.
    pub fn parse(text: &str) -> Result<Self, PairingPayloadError> {
        let payload: Self = serde_json::from_str(text.trim())
            .map_err(|e| PairingPayloadError::Malformed(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    /// Checks the acceptance rule: `app == "MouseShare"` and no empty field.
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails.
    pub fn validate(&self) -> Result<(), PairingPayloadError> {
        if self.app != PAIRING_APP_ID {
            return Err(PairingPayloadError::WrongApp(self.app.clone()));
        }
        for (name, value) in [("ip", &self.ip), ("port", &self.port), ("code", &self.code)] {
            if value.trim().is_empty() {
                return Err(PairingPayloadError::MissingField(name));
            }
        }
        Ok(())
    }

    /// The combined `"ip:port"` string, as the user would have typed it.
    pub fn endpoint_string(&self) -> String {
        format!("{}:{}", self.ip.trim(), self.port.trim())
    }

    /// Parses [`Self::endpoint_string`] into an [`Endpoint`].
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] if `ip` is blank.
    pub fn endpoint(&self) -> Result<Endpoint, EndpointError> {
        Endpoint::parse(&self.endpoint_string())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
