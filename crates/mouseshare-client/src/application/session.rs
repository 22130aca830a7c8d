//! PairingSession: the connection lifecycle state machine.
//!
//! # States
//!
//! ```text
//!                connect()                 transport Connected
//! Disconnected ───────────> Connecting ─────────────────────────> Pairing
//!      ^  ^                     │          (sends `pairing`)         │
//!      │  │  transport error    │                                    │ pairing_response
//!      │  │  / timeout          v                                    │ status = "success"
//!      │  └──────────────── Error <── pairing rejected ──────────────┤ (sends `screen_info`)
//!      │    (connect() again)   │     (then straight on to           v
//!      │                        │      Disconnected)             Connected
//!      └──── disconnect() / transport Closed ──────────────────────────┘
//! ```
//!
//! `Error` is not terminal: `connect()` is accepted from `Disconnected` and
//! from `Error`, and rejected with [`SessionError::AlreadyActive`] anywhere
//! else.
//!
//! # Ownership
//!
//! [`Session`] owns the state, the active transport link, the frame decoder
//! and the activity log; its [`InputDispatcher`] owns the cursor.  Nothing is
//! shared behind locks: [`run_session`] drives the session from one tokio
//! task and every command or transport event is handled to completion before
//! the next one.
//!
//! # Observers
//!
//! A UI registers a [`SessionObserver`] and is told about state changes,
//! cursor moves, activity log entries and failures as they happen.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mouseshare_core::{
    encode_message, protocol::messages::PAIRING_STATUS_SUCCESS, ActivityLog, ActivityLogEntry,
    CursorPosition, Endpoint, FrameDecoder, InboundMessage, OutboundMessage,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    sync::{
        mpsc::{self, error::TryRecvError},
        oneshot,
    },
    task::JoinHandle,
    time,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::dispatch_input::{DispatchReport, InputDispatcher, TouchInjector};
use crate::application::transport::{
    ConnectionId, Connector, TransportError, TransportEvent, TransportEventKind, TransportHandle,
};

/// How long a connection attempt may take before it is reported as timed out.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Screen size reported when the UI has not supplied one.
pub const DEFAULT_SCREEN_WIDTH: u32 = 1080;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 1920;

/// How often [`run_session`] checks the idle timeout.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Transport events [`run_session`] applies back to back before it looks
/// for a pending command.
const EVENT_BATCH: usize = 64;

// ── State and errors ──────────────────────────────────────────────────────────

/// Lifecycle state of the session.  Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// TCP connection in progress.
    Connecting,
    /// Connected; the pairing code was sent and the host has not answered yet.
    Pairing,
    /// Paired; host input is being applied.
    Connected,
    /// The last attempt failed.  `connect()` may be called again.
    Error,
}

impl SessionState {
    /// `true` while a connection attempt or session is in progress.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Pairing | Self::Connected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors surfaced by the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The endpoint or pairing code is missing or unusable.  Nothing was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `connect()` was called while a session is already in progress.
    #[error("already connected or connecting")]
    AlreadyActive,

    /// The connection could not be established.
    #[error("could not connect: {0}")]
    ConnectFailure(TransportError),

    /// An established connection failed.
    #[error("connection lost: {0}")]
    ConnectionLost(TransportError),

    /// The host did not accept the pairing code.
    #[error("pairing rejected by host (status {status:?})")]
    PairingRejected { status: String },

    /// Nothing arrived from the host for the configured idle timeout.
    #[error("no data from host for {0:?}")]
    IdleTimeout(Duration),

    /// The task driving the session has exited.
    #[error("session task has stopped")]
    Stopped,
}

// ── Configuration and observer ────────────────────────────────────────────────

/// Tunables for a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub connect_timeout: Duration,
    /// Close the connection when nothing arrives for this long while pairing
    /// or connected.  `None` disables the check.
    pub idle_timeout: Option<Duration>,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            idle_timeout: None,
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
        }
    }
}

/// Receives session updates, typically to render them.
///
/// Callbacks run on the session task and must return quickly.
pub trait SessionObserver: Send + Sync {
    fn on_state_changed(&self, state: SessionState);

    fn on_cursor_changed(&self, cursor: CursorPosition);

    fn on_log_appended(&self, entry: &ActivityLogEntry);

    /// A failure the user should be told about (connect failure, rejected
    /// pairing, lost connection).
    fn on_failure(&self, _error: &SessionError) {}

    /// A new connection attempt started.
    fn on_session_started(&self, _session_id: Uuid, _endpoint: &Endpoint) {}
}

// ── Session ───────────────────────────────────────────────────────────────────

struct ActiveLink {
    handle: Box<dyn TransportHandle>,
    endpoint: Endpoint,
    code: String,
    session_id: Uuid,
}

/// The pairing and input-relay session.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    connector: Arc<dyn Connector>,
    observer: Arc<dyn SessionObserver>,
    dispatcher: InputDispatcher,
    decoder: FrameDecoder,
    activity: ActivityLog,
    link: Option<ActiveLink>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    next_connection: u64,
    last_inbound: Option<Instant>,
}

impl Session {
    /// Creates a disconnected session.
    ///
    /// Returns the session and the receiver on which its transport events
    /// arrive; feed those back through [`Session::handle_event`] (or let
    /// [`run_session`] do it).
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        injector: Arc<dyn TouchInjector>,
        observer: Arc<dyn SessionObserver>,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let dispatcher = InputDispatcher::new(injector, config.screen_width, config.screen_height);
        let session = Self {
            config,
            state: SessionState::Disconnected,
            connector,
            observer,
            dispatcher,
            decoder: FrameDecoder::new(),
            activity: ActivityLog::new(),
            link: None,
            events_tx,
            next_connection: 0,
            last_inbound: None,
        };
        (session, events_rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> Option<CursorPosition> {
        self.dispatcher.cursor()
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Identifier of the current connection attempt, if one is open.
    pub fn session_id(&self) -> Option<Uuid> {
        self.link.as_ref().map(|l| l.session_id)
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.link.as_ref().map(|l| &l.endpoint)
    }

    /// Starts a connection to `endpoint` (`"host"` or `"host:port"`) that
    /// will pair with `code`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyActive`] unless the state is `Disconnected`
    ///   or `Error`.
    /// - [`SessionError::InvalidInput`] if either argument is blank or the
    ///   endpoint has no host.
    ///
    /// In both cases no connection is attempted.
    pub fn connect(&mut self, endpoint: &str, code: &str) -> Result<(), SessionError> {
        if self.state.is_active() {
            self.record("Already connected or connecting");
            return Err(SessionError::AlreadyActive);
        }

        let code = code.trim();
        if endpoint.trim().is_empty() || code.is_empty() {
            warn!("connect called without an endpoint or pairing code");
            return Err(SessionError::InvalidInput(
                "host address and pairing code are required".to_string(),
            ));
        }
        let endpoint =
            Endpoint::parse(endpoint).map_err(|e| SessionError::InvalidInput(e.to_string()))?;

        self.close_link();
        self.next_connection += 1;
        let id = ConnectionId(self.next_connection);
        let session_id = Uuid::new_v4();

        info!(%session_id, connection = %id, %endpoint, "starting connection attempt");
        self.record(format!("Connecting to {endpoint}..."));

        let handle = self.connector.connect(
            id,
            &endpoint,
            self.config.connect_timeout,
            self.events_tx.clone(),
        );
        self.observer.on_session_started(session_id, &endpoint);
        self.link = Some(ActiveLink {
            handle,
            endpoint,
            code: code.to_string(),
            session_id,
        });
        self.last_inbound = None;
        self.set_state(SessionState::Connecting);
        Ok(())
    }

    /// Tears down the current connection, if any, and moves to
    /// `Disconnected`.  Safe to call in any state.
    pub fn disconnect(&mut self) {
        if self.close_link() {
            self.record("Disconnected from desktop");
        }
        self.set_state(SessionState::Disconnected);
    }

    /// Sets the screen size reported in `screen_info` and used for scroll
    /// fallbacks.  The scroll fallback uses it immediately; the host learns
    /// it from the `screen_info` sent on the next successful pairing.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.config.screen_width = width;
        self.config.screen_height = height;
        self.dispatcher.set_viewport(width, height);
    }

    /// Applies one transport event.  Events from a connection other than the
    /// current one are ignored.
    pub fn handle_event(&mut self, event: TransportEvent) {
        let current = self.link.as_ref().map(|l| l.handle.id());
        if current != Some(event.connection) {
            debug!(connection = %event.connection, "ignoring event from stale connection");
            return;
        }

        match event.kind {
            TransportEventKind::Connected => self.on_connected(),
            TransportEventKind::Data(bytes) => self.on_data(&bytes),
            TransportEventKind::Error(e) => self.on_transport_error(e),
            TransportEventKind::Closed => self.on_closed(),
        }
    }

    /// Enforces the idle timeout as of `now`.
    pub fn check_idle(&mut self, now: Instant) {
        let Some(timeout) = self.config.idle_timeout else {
            return;
        };
        if !matches!(self.state, SessionState::Pairing | SessionState::Connected) {
            return;
        }
        let Some(last) = self.last_inbound else {
            return;
        };
        if now.saturating_duration_since(last) < timeout {
            return;
        }

        self.record(format!(
            "No data from desktop for {}s; closing connection",
            timeout.as_secs()
        ));
        self.fail(SessionError::IdleTimeout(timeout));
    }

    // ── Transport events ──────────────────────────────────────────────────────

    fn on_connected(&mut self) {
        if self.state != SessionState::Connecting {
            debug!(state = %self.state, "ignoring duplicate Connected event");
            return;
        }
        self.record("TCP connection established");
        self.last_inbound = Some(Instant::now());

        let Some(code) = self.link.as_ref().map(|l| l.code.clone()) else {
            return;
        };
        match self.send(&OutboundMessage::Pairing { code }) {
            Ok(()) => {
                self.record("Pairing code sent");
                self.set_state(SessionState::Pairing);
            }
            Err(e) => {
                self.record(format!("Connection error: {e}"));
                self.fail(e);
            }
        }
    }

    fn on_data(&mut self, bytes: &[u8]) {
        self.last_inbound = Some(Instant::now());

        for result in self.decoder.push(bytes) {
            // A rejected pairing tears the link down mid-chunk.
            if self.link.is_none() {
                break;
            }
            match result {
                Ok(msg) => self.handle_message(msg),
                Err(e) => {
                    warn!("dropping inbound payload: {e}");
                    self.record(format!("Parse error: {e}"));
                }
            }
        }
    }

    fn on_transport_error(&mut self, error: TransportError) {
        self.record(format!("Connection error: {error}"));
        let error = if self.state == SessionState::Connecting {
            SessionError::ConnectFailure(error)
        } else {
            SessionError::ConnectionLost(error)
        };
        self.fail(error);
    }

    fn on_closed(&mut self) {
        self.record("Connection closed");
        self.close_link();
        self.set_state(SessionState::Disconnected);
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: InboundMessage) {
        match (self.state, msg) {
            (SessionState::Pairing, InboundMessage::PairingResponse { status }) => {
                self.on_pairing_response(status);
            }
            (SessionState::Connected, msg) => {
                let report = self.dispatcher.dispatch(&msg);
                self.apply(report);
            }
            (_, InboundMessage::Pong) => {}
            (state, msg) => {
                warn!(%state, kind = msg.kind(), "unexpected message before pairing completed; discarded");
            }
        }
    }

    fn on_pairing_response(&mut self, status: String) {
        if status != PAIRING_STATUS_SUCCESS {
            self.record("✗ Pairing failed - invalid code");
            self.fail(SessionError::PairingRejected { status });
            self.set_state(SessionState::Disconnected);
            return;
        }

        self.record("✓ Successfully paired with desktop!");
        self.set_state(SessionState::Connected);

        let (width, height) = (self.config.screen_width, self.config.screen_height);
        match self.send(&OutboundMessage::ScreenInfo { width, height }) {
            Ok(()) => self.record(format!("Screen info sent: {width}x{height}")),
            Err(e) => {
                self.record(format!("Connection error: {e}"));
                self.fail(e);
            }
        }
    }

    fn apply(&mut self, report: DispatchReport) {
        for line in report.log_lines {
            self.record(line);
        }
        if let Some(cursor) = report.cursor {
            self.observer.on_cursor_changed(cursor);
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn send(&mut self, msg: &OutboundMessage) -> Result<(), SessionError> {
        let bytes = encode_message(msg).map_err(|e| {
            SessionError::ConnectionLost(TransportError::WriteFailure(e.to_string()))
        })?;
        let link = self
            .link
            .as_ref()
            .ok_or(SessionError::ConnectionLost(TransportError::NotConnected))?;
        debug!(kind = msg.kind(), len = bytes.len(), "sending message");
        link.handle.send(bytes).map_err(SessionError::ConnectionLost)
    }

    /// Closes the transport and moves to `Error`.
    fn fail(&mut self, error: SessionError) {
        warn!("session failed: {error}");
        self.close_link();
        self.observer.on_failure(&error);
        self.set_state(SessionState::Error);
    }

    /// Returns `true` if a link was open.
    fn close_link(&mut self) -> bool {
        match self.link.take() {
            Some(mut link) => {
                link.handle.close();
                self.decoder.reset();
                self.last_inbound = None;
                true
            }
            None => false,
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        info!(from = %self.state, to = %state, "session state changed");
        self.state = state;
        self.observer.on_state_changed(state);
    }

    fn record(&mut self, text: impl Into<String>) {
        let entry = self.activity.push(text);
        info!(session_id = ?self.link.as_ref().map(|l| l.session_id), "{}", entry.text);
        self.observer.on_log_appended(entry);
    }
}

// ── Session runner ────────────────────────────────────────────────────────────

/// Requests accepted by [`run_session`].
#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        endpoint: String,
        code: String,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Disconnect,
    SetScreenSize {
        width: u32,
        height: u32,
    },
    /// Disconnect and stop the runner.
    Shutdown,
}

/// Cloneable front end to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Asks the session to connect and waits for the request to be accepted
    /// or rejected.  Connection progress is reported through the observer.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] from [`Session::connect`], or
    /// [`SessionError::Stopped`] if the runner has exited.
    pub async fn connect(
        &self,
        endpoint: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::Connect {
                endpoint: endpoint.into(),
                code: code.into(),
                reply,
            })
            .map_err(|_| SessionError::Stopped)?;
        response.await.map_err(|_| SessionError::Stopped)?
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] if the runner has exited.
    pub fn disconnect(&self) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Disconnect)
            .map_err(|_| SessionError::Stopped)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::Stopped`] if the runner has exited.
    pub fn set_screen_size(&self, width: u32, height: u32) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::SetScreenSize { width, height })
            .map_err(|_| SessionError::Stopped)
    }

    /// Stops the runner.  Does nothing if it has already exited.
    pub fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
    }
}

/// Spawns [`run_session`] on the current tokio runtime.
///
/// The join handle yields the session back once the runner stops.
pub fn spawn_session(
    session: Session,
    events: mpsc::UnboundedReceiver<TransportEvent>,
) -> (SessionHandle, JoinHandle<Session>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_session(session, rx, events));
    (SessionHandle { commands: tx }, task)
}

/// Drives `session` until a `Shutdown` command arrives or every
/// [`SessionHandle`] is dropped.
pub async fn run_session(
    mut session: Session,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) -> Session {
    let mut idle_check = time::interval(IDLE_CHECK_INTERVAL);
    idle_check.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    let mut events_since_command = 0usize;

    loop {
        // Events already received are applied before the next command, so a
        // command always acts on up-to-date state.  After EVENT_BATCH events
        // in a row a pending command is taken anyway, so a flooding host
        // cannot starve Disconnect or Shutdown.
        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                session.handle_event(event);
                events_since_command += 1;
                if events_since_command >= EVENT_BATCH {
                    events_since_command = 0;
                    let pending = match commands.try_recv() {
                        Ok(command) => Some(Some(command)),
                        Err(TryRecvError::Empty) => None,
                        Err(TryRecvError::Disconnected) => Some(None),
                    };
                    if let Some(command) = pending {
                        if apply_command(&mut session, command).is_break() {
                            break;
                        }
                    }
                }
            }
            command = commands.recv() => {
                events_since_command = 0;
                if apply_command(&mut session, command).is_break() {
                    break;
                }
            }
            _ = idle_check.tick() => session.check_idle(Instant::now()),
        }
    }

    debug!("session runner stopped");
    session
}

/// Applies one command; `None` means every handle was dropped.
fn apply_command(session: &mut Session, command: Option<SessionCommand>) -> ControlFlow<()> {
    match command {
        Some(SessionCommand::Connect {
            endpoint,
            code,
            reply,
        }) => {
            let result = session.connect(&endpoint, &code);
            let _ = reply.send(result);
        }
        Some(SessionCommand::Disconnect) => session.disconnect(),
        Some(SessionCommand::SetScreenSize { width, height }) => {
            session.set_screen_size(width, height);
        }
        Some(SessionCommand::Shutdown) | None => {
            session.disconnect();
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
