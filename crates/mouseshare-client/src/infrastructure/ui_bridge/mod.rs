//! Command bridge between the session and a UI.
//!
//! The UI (a React Native screen, or the CLI in `main.rs`) never touches the
//! [`Session`](crate::application::session::Session) directly.  It:
//!
//! - registers a [`SessionView`] as the session's observer and polls
//!   [`get_session_status`] for a serializable [`SessionStatusDto`];
//! - issues commands through [`connect_to_host`], [`connect_with_payload`]
//!   and [`disconnect_from_host`], which forward to a
//!   [`SessionHandle`].
//!
//! # `CommandResult<T>`
//!
//! All commands return `CommandResult<T>`, a unified envelope:
//! ```json
//! { "success": true,  "data": {...}, "error": null  }
//! { "success": false, "data": null,  "error": "..."  }
//! ```
//! so the UI side handles errors the same way for every command.
//!
//! # Why a std `Mutex`?
//!
//! Observer callbacks are synchronous and run on the session task.  The
//! snapshot lock is held only to copy a few fields, never across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use mouseshare_core::{ActivityLog, ActivityLogEntry, CursorPosition, Endpoint, PairingPayload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::session::{SessionError, SessionHandle, SessionObserver, SessionState};

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Snapshot {
    state: SessionState,
    cursor: Option<CursorPosition>,
    log: ActivityLog,
    last_error: Option<String>,
    session_id: Option<Uuid>,
    endpoint: Option<Endpoint>,
}

/// Keeps the latest session state for the UI to read.
#[derive(Debug, Default)]
pub struct SessionView {
    snapshot: Mutex<Snapshot>,
}

impl SessionView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn cursor(&self) -> Option<CursorPosition> {
        self.lock().cursor
    }

    /// The most recent failure message, cleared when a new attempt starts.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Serializable copy of everything the UI shows.
    pub fn status(&self) -> SessionStatusDto {
        let snap = self.lock();
        SessionStatusDto {
            state: snap.state.to_string(),
            endpoint: snap.endpoint.as_ref().map(ToString::to_string),
            session_id: snap.session_id,
            cursor_x: snap.cursor.map(|c| c.x),
            cursor_y: snap.cursor.map(|c| c.y),
            activity: snap.log.latest_first(),
            last_error: snap.last_error.clone(),
        }
    }
}

impl SessionObserver for SessionView {
    fn on_state_changed(&self, state: SessionState) {
        self.lock().state = state;
    }

    fn on_cursor_changed(&self, cursor: CursorPosition) {
        self.lock().cursor = Some(cursor);
    }

    fn on_log_appended(&self, entry: &ActivityLogEntry) {
        self.lock().log.push_at(entry.timestamp_us, entry.text.clone());
    }

    fn on_failure(&self, error: &SessionError) {
        self.lock().last_error = Some(error.to_string());
    }

    fn on_session_started(&self, session_id: Uuid, endpoint: &Endpoint) {
        let mut snap = self.lock();
        snap.session_id = Some(session_id);
        snap.endpoint = Some(endpoint.clone());
        snap.last_error = None;
    }
}

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Status snapshot returned to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatusDto {
    /// `"Disconnected"`, `"Connecting"`, `"Pairing"`, `"Connected"` or `"Error"`.
    pub state: String,
    pub endpoint: Option<String>,
    pub session_id: Option<Uuid>,
    pub cursor_x: Option<f64>,
    pub cursor_y: Option<f64>,
    /// Newest entry first.
    pub activity: Vec<ActivityLogEntry>,
    pub last_error: Option<String>,
}

/// Unified response wrapper for UI commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    /// `true` if the command completed successfully; `false` on error.
    pub success: bool,
    /// The command's return value, present only when `success` is `true`.
    pub data: Option<T>,
    /// A human-readable error message, present only when `success` is `false`.
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

impl<T: Serialize> From<Result<T, SessionError>> for CommandResult<T> {
    fn from(result: Result<T, SessionError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the current status snapshot.
pub fn get_session_status(view: &SessionView) -> CommandResult<SessionStatusDto> {
    CommandResult::ok(view.status())
}

/// Starts a connection to a host typed in by the user.
pub async fn connect_to_host(
    handle: &SessionHandle,
    endpoint: &str,
    code: &str,
) -> CommandResult<()> {
    handle.connect(endpoint, code).await.into()
}

/// Starts a connection from a scanned QR payload.
///
/// The payload is validated before anything is sent to the session.
pub async fn connect_with_payload(handle: &SessionHandle, payload_text: &str) -> CommandResult<()> {
    match PairingPayload::parse(payload_text) {
        Ok(payload) => connect_to_host(handle, &payload.endpoint_string(), &payload.code).await,
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Ends the current session.
pub fn disconnect_from_host(handle: &SessionHandle) -> CommandResult<()> {
    handle.disconnect().into()
}

/// Updates the screen size reported to the host on the next pairing.
pub fn update_screen_size(handle: &SessionHandle, width: u32, height: u32) -> CommandResult<()> {
    if width == 0 || height == 0 {
        return CommandResult::err("screen dimensions must be non-zero");
    }
    handle.set_screen_size(width, height).into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::{spawn_session, Session, SessionConfig};
    use crate::infrastructure::{input_injection::DisabledInjector, network::TcpConnector};
    use std::sync::Arc;

    #[test]
    fn test_new_view_reports_disconnected_with_empty_log() {
        // Arrange / Act
        let status = SessionView::new().status();

        // Assert
        assert_eq!(status.state, "Disconnected");
        assert!(status.activity.is_empty());
        assert!(status.cursor_x.is_none());
        assert!(status.session_id.is_none());
    }

    #[test]
    fn test_view_tracks_observer_callbacks() {
        // Arrange
        let view = SessionView::new();
        let id = Uuid::new_v4();

        // Act
        view.on_session_started(id, &Endpoint::new("10.0.0.2", 5555));
        view.on_state_changed(SessionState::Connected);
        view.on_cursor_changed(CursorPosition::new(3.0, 4.0));
        view.on_log_appended(&ActivityLogEntry {
            timestamp_us: 1,
            text: "first".into(),
        });
        view.on_log_appended(&ActivityLogEntry {
            timestamp_us: 2,
            text: "second".into(),
        });

        // Assert
        let status = get_session_status(&view).data.unwrap();
        assert_eq!(status.state, "Connected");
        assert_eq!(status.endpoint.as_deref(), Some("10.0.0.2:5555"));
        assert_eq!(status.session_id, Some(id));
        assert_eq!((status.cursor_x, status.cursor_y), (Some(3.0), Some(4.0)));
        let texts: Vec<_> = status.activity.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[test]
    fn test_failure_is_kept_until_next_attempt() {
        let view = SessionView::new();
        view.on_failure(&SessionError::PairingRejected {
            status: "invalid".into(),
        });
        assert!(view.last_error().unwrap().contains("pairing rejected"));

        view.on_session_started(Uuid::new_v4(), &Endpoint::new("h", 1));

        assert!(view.last_error().is_none());
    }

    #[test]
    fn test_view_log_is_bounded() {
        let view = SessionView::new();
        for i in 0..30 {
            view.on_log_appended(&ActivityLogEntry {
                timestamp_us: i,
                text: format!("line {i}"),
            });
        }
        assert_eq!(view.status().activity.len(), 20);
    }

    #[test]
    fn test_command_result_serializes_envelope() {
        let ok = serde_json::to_value(CommandResult::ok(5u32)).unwrap();
        let err = serde_json::to_value(CommandResult::<u32>::err("nope")).unwrap();

        assert_eq!(ok, serde_json::json!({"success": true, "data": 5, "error": null}));
        assert_eq!(err, serde_json::json!({"success": false, "data": null, "error": "nope"}));
    }

    #[tokio::test]
    async fn test_update_screen_size_rejects_zero_and_forwards_valid_sizes() {
        // Arrange
        let (session, events) = Session::new(
            SessionConfig::default(),
            Arc::new(TcpConnector::new()),
            Arc::new(DisabledInjector),
            Arc::new(SessionView::new()),
        );
        let (handle, task) = spawn_session(session, events);

        // Act
        let rejected = update_screen_size(&handle, 0, 10);
        let accepted = update_screen_size(&handle, 720, 1600);
        handle.shutdown();
        let session = task.await.unwrap();

        // Assert
        assert!(!rejected.success);
        assert!(rejected.error.is_some());
        assert!(accepted.success);
        assert_eq!(session.config().screen_width, 720);
        assert_eq!(session.config().screen_height, 1600);
    }

    #[test]
    fn test_command_result_from_session_error() {
        let result: CommandResult<()> = Err(SessionError::AlreadyActive).into();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("already connected or connecting"));
    }
}
