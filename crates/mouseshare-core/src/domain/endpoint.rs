//! Desktop host endpoint parsing.
//!
//! Users type the host as `"192.168.1.10:5555"` or just `"192.168.1.10"`.
//! The port is optional and falls back to [`DEFAULT_PORT`] whenever it is
//! missing or not a usable port number, so a typo in the port never blocks a
//! connection attempt to the right machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port the desktop host listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5555;

/// Errors produced when an endpoint string cannot name a host at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The input was empty or whitespace only.
    #[error("endpoint is empty")]
    Empty,

    /// The input had a port part but nothing before the colon.
    #[error("endpoint {0:?} has no host")]
    MissingHost(String),
}

/// A desktop host address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint from already-validated parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses a combined `"host:port"` string.
    ///
    /// The host is everything before the first `:` and the port is the field
    /// after it; any further `:` fields are ignored, so `"h:6000:x"` is port
    /// 6000.  The port falls back to [`DEFAULT_PORT`] when absent, not an
    /// integer, out of `u16` range, or `0`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] if the input is empty or has no host part.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mouseshare_core::Endpoint;
    ///
    /// assert_eq!(Endpoint::parse("10.0.0.2").unwrap().port, 5555);
    /// assert_eq!(Endpoint::parse("10.0.0.2:6000").unwrap().port, 6000);
    /// assert_eq!(Endpoint::parse("10.0.0.2:abc").unwrap().port, 5555);
    /// ```
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EndpointError::Empty);
        }

        let mut fields = input.split(':');
        let host = fields.next().unwrap_or_default().trim();
        let port = fields.next().map_or(DEFAULT_PORT, parse_port);

        if host.is_empty() {
            return Err(EndpointError::MissingHost(input.to_string()));
        }

        Ok(Self::new(host, port))
    }
}

fn parse_port(text: &str) -> u16 {
    match text.trim().parse::<u16>() {
        Ok(0) | Err(_) => DEFAULT_PORT,
        Ok(port) => port,
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
