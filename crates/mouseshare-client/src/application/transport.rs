//! Transport contract used by the session.
//!
//! The session never touches sockets.  It asks a [`Connector`] to open a
//! connection and gets back a [`TransportHandle`] for sending and closing;
//! everything the connection observes afterwards arrives as a
//! [`TransportEvent`] on the channel handed to [`Connector::connect`].
//!
//! Every event carries the [`ConnectionId`] of the attempt that produced it,
//! so the session can ignore late events from a connection it already
//! replaced or tore down.
//!
//! The TCP implementation lives in `infrastructure::network`.

use std::fmt;
use std::time::Duration;

use mouseshare_core::Endpoint;
use thiserror::Error;
use tokio::sync::mpsc;

/// Identifies one connection attempt within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Errors reported by a transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No connection was established within the configured timeout.
    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The host actively refused the connection.
    #[error("connection refused by {0}")]
    ConnectRefused(String),

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {reason}")]
    DnsFailure { host: String, reason: String },

    /// `send` was called on a handle that is closed.
    #[error("not connected")]
    NotConnected,

    /// Writing to an established connection failed.
    #[error("write failed: {0}")]
    WriteFailure(String),

    /// Any other socket error.
    #[error("I/O error: {0}")]
    Io(String),
}

/// What happened on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// The connection is open; sends will now reach the host.
    Connected,
    /// Raw bytes read from the host.  Message boundaries are not preserved.
    Data(Vec<u8>),
    /// The connection failed.  No further events follow.
    Error(TransportError),
    /// The host closed the connection.  No further events follow.
    Closed,
}

/// An event tagged with the connection that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub connection: ConnectionId,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn new(connection: ConnectionId, kind: TransportEventKind) -> Self {
        Self { connection, kind }
    }
}

/// Sender half of the event channel a connector reports on.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Opens connections.
pub trait Connector: Send + Sync {
    /// Starts connecting to `endpoint` and returns immediately.
    ///
    /// The outcome is reported later on `events`: `Connected` on success, or
    /// `Error` with `ConnectTimeout`, `ConnectRefused`, or `DnsFailure`.
    fn connect(
        &self,
        id: ConnectionId,
        endpoint: &Endpoint,
        timeout: Duration,
        events: EventSender,
    ) -> Box<dyn TransportHandle>;
}

/// The owner's side of one open (or opening) connection.
pub trait TransportHandle: Send {
    fn id(&self) -> ConnectionId;

    /// Queues `bytes` for sending without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] once the handle is closed.
    fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the connection.  Calling it again is a no-op.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}
