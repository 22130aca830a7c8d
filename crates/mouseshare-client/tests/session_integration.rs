//! End-to-end tests for the MouseShare client session.
//!
//! Each test plays the desktop host on a loopback `TcpListener` and drives a
//! real [`Session`] through [`spawn_session`] with the production
//! [`TcpConnector`].  Injection is observed through [`MockInjector`] and
//! session state through [`SessionView`], exactly as a UI would see it.

use std::sync::Arc;
use std::time::Duration;

use mouseshare_client::application::dispatch_input::TouchInjector;
use mouseshare_client::application::session::{
    spawn_session, Session, SessionConfig, SessionHandle, SessionObserver, SessionState,
};
use mouseshare_client::infrastructure::{
    input_injection::mock::{MockInjector, RecordedGesture},
    network::TcpConnector,
    ui_bridge::{connect_to_host, connect_with_payload, disconnect_from_host, SessionView},
};
use mouseshare_core::CursorPosition;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const WAIT: Duration = Duration::from_secs(5);

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Client {
    handle: SessionHandle,
    task: JoinHandle<Session>,
    view: Arc<SessionView>,
    injector: Arc<MockInjector>,
}

fn start_client(injector: MockInjector) -> Client {
    let injector = Arc::new(injector);
    let view = Arc::new(SessionView::new());
    let config = SessionConfig {
        connect_timeout: WAIT,
        screen_width: 1080,
        screen_height: 2400,
        ..SessionConfig::default()
    };
    let (session, events) = Session::new(
        config,
        Arc::new(TcpConnector::new()),
        Arc::clone(&injector) as Arc<dyn TouchInjector>,
        Arc::clone(&view) as Arc<dyn SessionObserver>,
    );
    let (handle, task) = spawn_session(session, events);
    Client {
        handle,
        task,
        view,
        injector,
    }
}

/// The host's end of one accepted connection.
struct Host {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Host {
    async fn accept(listener: &TcpListener) -> Self {
        let (socket, _) = tokio::time::timeout(WAIT, listener.accept())
            .await
            .expect("client never connected")
            .unwrap();
        let (read, writer) = socket.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn read_message(&mut self) -> Value {
        let mut line = String::new();
        tokio::time::timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .expect("client sent nothing")
            .unwrap();
        serde_json::from_str(&line).expect("client sent invalid JSON")
    }

    async fn write(&mut self, text: &str) {
        self.writer.write_all(text.as_bytes()).await.unwrap();
    }
}

async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
    (listener, endpoint)
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_pairing_and_input_relay() {
    // Arrange
    let (listener, endpoint) = listener().await;
    let client = start_client(MockInjector::new());

    // Act – client side
    let result = connect_to_host(&client.handle, &endpoint, "123456").await;
    assert!(result.success, "connect rejected: {:?}", result.error);

    // Act – host side: check the handshake, then stream input
    let mut host = Host::accept(&listener).await;
    let pairing = host.read_message().await;
    assert_eq!(pairing, serde_json::json!({"type": "pairing", "code": "123456"}));

    host.write("{\"type\":\"pairing_response\",\"status\":\"success\"}\n")
        .await;
    let screen = host.read_message().await;
    assert_eq!(
        screen,
        serde_json::json!({"type": "screen_info", "width": 1080, "height": 2400})
    );
    wait_until("Connected", || client.view.state() == SessionState::Connected).await;

    // Two messages in one write, no separator between them
    host.write(concat!(
        "{\"type\":\"mouse\",\"x\":100,\"y\":200}",
        "{\"type\":\"click\",\"x\":100,\"y\":200,\"action\":\"down\",\"button\":\"left\"}\n",
    ))
    .await;
    host.write("{\"type\":\"scroll\",\"dx\":0,\"dy\":1}\n").await;

    // Assert
    let injector = Arc::clone(&client.injector);
    wait_until("swipe", || !injector.gestures.lock().unwrap().is_empty()).await;
    assert_eq!(*client.injector.moves.lock().unwrap(), vec![(100.0, 200.0)]);
    assert_eq!(*client.injector.clicks.lock().unwrap(), vec![(100.0, 200.0)]);
    assert_eq!(
        *client.injector.gestures.lock().unwrap(),
        vec![RecordedGesture {
            start_x: 100.0,
            start_y: 200.0,
            end_x: 100.0,
            end_y: 150.0,
        }]
    );
    assert_eq!(client.view.cursor(), Some(CursorPosition::new(100.0, 200.0)));

    let status = client.view.status();
    assert_eq!(status.state, "Connected");
    assert_eq!(status.endpoint.as_deref(), Some(endpoint.as_str()));
    assert!(status.session_id.is_some());
    let texts: Vec<_> = status.activity.iter().map(|e| e.text.as_str()).collect();
    assert!(texts.contains(&"✓ Successfully paired with desktop!"));
    assert!(texts.contains(&"Click at (100, 200) - down"));

    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_rejected_pairing_ends_disconnected_without_injection() {
    // Arrange
    let (listener, endpoint) = listener().await;
    let client = start_client(MockInjector::new());

    // Act
    assert!(connect_to_host(&client.handle, &endpoint, "000000").await.success);
    let mut host = Host::accept(&listener).await;
    host.read_message().await;
    host.write(concat!(
        "{\"type\":\"pairing_response\",\"status\":\"invalid_code\"}\n",
        "{\"type\":\"click\",\"x\":1,\"y\":1,\"action\":\"down\"}\n",
    ))
    .await;

    // Assert
    let view = Arc::clone(&client.view);
    wait_until("pairing failure", || view.last_error().is_some()).await;
    wait_until("Disconnected", || view.state() == SessionState::Disconnected).await;
    assert!(view.last_error().unwrap().contains("pairing rejected"));
    assert_eq!(client.injector.total_calls(), 0);

    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_refused_connection_reports_error_and_allows_retry() {
    // Arrange: a port nobody listens on
    let (listener, endpoint) = listener().await;
    drop(listener);
    let client = start_client(MockInjector::new());

    // Act
    assert!(connect_to_host(&client.handle, &endpoint, "123456").await.success);

    // Assert
    let view = Arc::clone(&client.view);
    wait_until("Error", || view.state() == SessionState::Error).await;
    assert!(view.last_error().unwrap().contains("refused"));

    // Error is not terminal
    let retry = connect_to_host(&client.handle, &endpoint, "123456").await;
    assert!(retry.success);

    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_host_closing_connection_returns_to_disconnected() {
    let (listener, endpoint) = listener().await;
    let client = start_client(MockInjector::new());

    assert!(connect_to_host(&client.handle, &endpoint, "123456").await.success);
    let mut host = Host::accept(&listener).await;
    host.read_message().await;
    host.write("{\"type\":\"pairing_response\",\"status\":\"success\"}\n")
        .await;
    host.read_message().await;
    drop(host);

    let view = Arc::clone(&client.view);
    wait_until("Disconnected", || view.state() == SessionState::Disconnected).await;
    assert!(view
        .status()
        .activity
        .iter()
        .any(|e| e.text == "Connection closed"));

    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_second_connect_is_rejected_while_active() {
    let (listener, endpoint) = listener().await;
    let client = start_client(MockInjector::new());

    assert!(connect_to_host(&client.handle, &endpoint, "123456").await.success);
    let second = connect_to_host(&client.handle, &endpoint, "654321").await;

    assert!(!second.success);
    assert_eq!(second.error.as_deref(), Some("already connected or connecting"));

    drop(listener);
    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_disconnect_command_closes_host_socket() {
    // Arrange
    let (listener, endpoint) = listener().await;
    let client = start_client(MockInjector::new());
    assert!(connect_to_host(&client.handle, &endpoint, "123456").await.success);
    let mut host = Host::accept(&listener).await;
    host.read_message().await;

    // Act
    assert!(disconnect_from_host(&client.handle).success);

    // Assert – the host sees EOF
    let mut line = String::new();
    let read = tokio::time::timeout(WAIT, host.reader.read_line(&mut line))
        .await
        .expect("socket never closed")
        .unwrap();
    assert_eq!(read, 0);
    let view = Arc::clone(&client.view);
    wait_until("Disconnected", || view.state() == SessionState::Disconnected).await;

    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_qr_payload_for_other_app_is_rejected_before_connecting() {
    let client = start_client(MockInjector::new());

    let result = connect_with_payload(
        &client.handle,
        r#"{"ip":"127.0.0.1","port":"5555","code":"123456","app":"OtherApp"}"#,
    )
    .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("OtherApp"));
    assert_eq!(client.view.state(), SessionState::Disconnected);

    client.handle.shutdown();
    client.task.await.unwrap();
}

#[tokio::test]
async fn test_qr_payload_connects_to_scanned_host() {
    let (listener, endpoint) = listener().await;
    let port = endpoint.rsplit(':').next().unwrap();
    let client = start_client(MockInjector::disabled());
    let payload = format!(
        r#"{{"ip":"127.0.0.1","port":"{port}","code":"424242","app":"MouseShare"}}"#
    );

    assert!(connect_with_payload(&client.handle, &payload).await.success);
    let mut host = Host::accept(&listener).await;

    assert_eq!(host.read_message().await["code"], "424242");

    client.handle.shutdown();
    client.task.await.unwrap();
}
