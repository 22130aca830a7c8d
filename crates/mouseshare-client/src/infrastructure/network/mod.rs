//! Network infrastructure for the client application.
//!
//! Implements the [`Connector`] contract over tokio TCP.
//!
//! Architecture:
//! - [`TcpConnector::connect`] spawns one task per attempt that resolves the
//!   host, connects under a timeout, and then reads the socket, forwarding
//!   every chunk as [`TransportEventKind::Data`].
//! - Outbound bytes go through an unbounded `mpsc` channel to a writer task,
//!   so [`TransportHandle::send`] never blocks the session.
//! - [`TcpTransportHandle::close`] drops the channel and aborts the reader;
//!   the writer drains and exits on its own.  Closing twice is harmless.
//!
//! Message framing is not done here.  The session owns a `FrameDecoder`
//! and feeds it the raw chunks.

use std::net::SocketAddr;
use std::time::Duration;

use mouseshare_core::Endpoint;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        lookup_host,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::mpsc,
    task::JoinHandle,
    time,
};
use tracing::{debug, info, warn};

pub use crate::application::transport::{
    ConnectionId, Connector, EventSender, TransportError, TransportEvent, TransportEventKind,
    TransportHandle,
};

/// Size of the socket read buffer.  Host messages are far smaller.
const READ_BUFFER_SIZE: usize = 8 * 1024;

fn emit(events: &EventSender, id: ConnectionId, kind: TransportEventKind) -> bool {
    events.send(TransportEvent::new(id, kind)).is_ok()
}

/// Opens real TCP connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for TcpConnector {
    /// Must be called from within a tokio runtime; otherwise the attempt
    /// fails immediately with [`TransportError::Io`].
    fn connect(
        &self,
        id: ConnectionId,
        endpoint: &Endpoint,
        timeout: Duration,
        events: EventSender,
    ) -> Box<dyn TransportHandle> {
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                emit(
                    &events,
                    id,
                    TransportEventKind::Error(TransportError::Io(e.to_string())),
                );
                return Box::new(TcpTransportHandle {
                    id,
                    outgoing: None,
                    task: None,
                });
            }
        };

        let task = runtime.spawn(drive_connection(
            id,
            endpoint.clone(),
            timeout,
            outgoing_rx,
            events,
        ));

        Box::new(TcpTransportHandle {
            id,
            outgoing: Some(outgoing_tx),
            task: Some(task),
        })
    }
}

/// Handle to one TCP connection attempt.
pub struct TcpTransportHandle {
    id: ConnectionId,
    outgoing: Option<mpsc::UnboundedSender<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl TransportHandle for TcpTransportHandle {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        match &self.outgoing {
            Some(tx) => tx.send(bytes).map_err(|_| TransportError::NotConnected),
            None => Err(TransportError::NotConnected),
        }
    }

    fn close(&mut self) {
        if self.outgoing.take().is_some() {
            debug!(connection = %self.id, "closing connection");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_closed(&self) -> bool {
        self.outgoing.is_none()
    }
}

impl Drop for TcpTransportHandle {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

async fn drive_connection(
    id: ConnectionId,
    endpoint: Endpoint,
    timeout: Duration,
    outgoing: mpsc::UnboundedReceiver<Vec<u8>>,
    events: EventSender,
) {
    let stream = match open_stream(&endpoint, timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(connection = %id, "could not connect to {endpoint}: {e}");
            emit(&events, id, TransportEventKind::Error(e));
            return;
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        debug!("set_nodelay failed: {e}");
    }

    info!(connection = %id, "connected to {endpoint}");
    if !emit(&events, id, TransportEventKind::Connected) {
        return;
    }

    let (reader, writer) = stream.into_split();
    let writer_task = tokio::spawn(write_loop(id, writer, outgoing, events.clone()));
    read_loop(id, reader, &events).await;
    writer_task.abort();
}

/// Resolves and connects, all within `timeout`.
async fn open_stream(endpoint: &Endpoint, timeout: Duration) -> Result<TcpStream, TransportError> {
    let attempt = async {
        let addrs: Vec<SocketAddr> = lookup_host((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|e| TransportError::DnsFailure {
                host: endpoint.host.clone(),
                reason: e.to_string(),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::DnsFailure {
                host: endpoint.host.clone(),
                reason: "no addresses found".to_string(),
            });
        }

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!("connect to {addr} failed: {e}");
                    last_error = Some(classify_connect_error(endpoint, e));
                }
            }
        }
        Err(last_error.unwrap_or_else(|| TransportError::Io("no address reachable".to_string())))
    };

    time::timeout(timeout, attempt)
        .await
        .map_err(|_| TransportError::ConnectTimeout(timeout))?
}

fn classify_connect_error(endpoint: &Endpoint, error: std::io::Error) -> TransportError {
    match error.kind() {
        std::io::ErrorKind::ConnectionRefused => TransportError::ConnectRefused(endpoint.to_string()),
        _ => TransportError::Io(error.to_string()),
    }
}

async fn read_loop(id: ConnectionId, mut reader: OwnedReadHalf, events: &EventSender) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                info!(connection = %id, "host closed the connection");
                emit(events, id, TransportEventKind::Closed);
                break;
            }
            Ok(n) => {
                if !emit(events, id, TransportEventKind::Data(buf[..n].to_vec())) {
                    break;
                }
            }
            Err(e) => {
                warn!(connection = %id, "read error: {e}");
                emit(events, id, TransportEventKind::Error(TransportError::Io(e.to_string())));
                break;
            }
        }
    }
}

async fn write_loop(
    id: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut outgoing: mpsc::UnboundedReceiver<Vec<u8>>,
    events: EventSender,
) {
    while let Some(bytes) = outgoing.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            warn!(connection = %id, "write error: {e}");
            emit(
                &events,
                id,
                TransportEventKind::Error(TransportError::WriteFailure(e.to_string())),
            );
            return;
        }
    }
    debug!(connection = %id, "writer finished");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
