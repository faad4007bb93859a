//! WebSocket push path: every notification the server accepts is forwarded
//! to each connected socket as one JSON text frame.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use glowlink_payments::api::{self, AppState};
use glowlink_payments::client::PaymentsClient;
use glowlink_payments::models::notification::{NewNotification, Notification, NotificationKind};
use glowlink_payments::notifications::store::JsonFileStore;
use glowlink_payments::notifications::NotificationCenter;
use glowlink_payments::payments::gateway::StripeGateway;

async fn spawn_server(store_path: PathBuf) -> (Arc<AppState>, String) {
    let (tx, _rx) = broadcast::channel(16);
    // The gateway is never called on this path; the address just has to
    // exist syntactically.
    let gateway = StripeGateway::new("sk_test_stub", "http://127.0.0.1:9");
    let center = NotificationCenter::new(Box::new(JsonFileStore::new(store_path)));

    let state = Arc::new(AppState {
        gateway: Arc::new(gateway),
        notifications: Mutex::new(center),
        tx,
        webhook_secret: None,
    });

    let app = api::router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, format!("127.0.0.1:{}", addr.port()))
}

/// The upgrade completes before the per-socket task subscribes, so tests
/// wait for the subscription instead of racing it.
async fn wait_for_subscribers(state: &AppState, count: usize) {
    for _ in 0..200 {
        if state.tx.receiver_count() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} WebSocket subscribers");
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn next_notification(socket: &mut Socket) -> Notification {
    let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for a push")
        .expect("socket closed early")
        .unwrap();

    match frame {
        Message::Text(raw) => serde_json::from_str(&raw).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn added_notifications_are_pushed_to_connected_clients() {
    let dir = tempfile::tempdir().unwrap();
    let (state, addr) = spawn_server(dir.path().join("notifications.json")).await;
    let client = PaymentsClient::new(format!("http://{addr}"));

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    wait_for_subscribers(&state, 1).await;

    let created = client
        .add_notification(&NewNotification {
            title: "New Booking".to_string(),
            message: "You have a new booking request".to_string(),
            kind: NotificationKind::Info,
            action_url: Some("/bookings".to_string()),
        })
        .await
        .unwrap();

    let pushed = next_notification(&mut socket).await;
    assert_eq!(pushed.id, created.id);
    assert_eq!(pushed.title, "New Booking");
    assert_eq!(pushed.message, "You have a new booking request");
    assert_eq!(pushed.kind, NotificationKind::Info);
    assert_eq!(pushed.action_url.as_deref(), Some("/bookings"));
    assert!(!pushed.read);
}

#[tokio::test]
async fn webhook_events_are_pushed_too() {
    let dir = tempfile::tempdir().unwrap();
    let (state, addr) = spawn_server(dir.path().join("notifications.json")).await;
    let http = reqwest::Client::new();

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    wait_for_subscribers(&state, 1).await;

    let body = r#"{"type":"payment_intent.succeeded","data":{"object":{"id":"pi_ws","metadata":{"stage":"completion"}}}}"#;
    let response = http
        .post(format!("http://{addr}/webhook"))
        .body(body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let pushed = next_notification(&mut socket).await;
    assert_eq!(pushed.title, "Payment Received");
    assert_eq!(pushed.message, "Completion payment received (pi_ws)");
    assert_eq!(pushed.kind, NotificationKind::Success);
}

#[tokio::test]
async fn a_dropped_client_does_not_affect_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let (state, addr) = spawn_server(dir.path().join("notifications.json")).await;
    let client = PaymentsClient::new(format!("http://{addr}"));

    let (mut first, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (mut second, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    wait_for_subscribers(&state, 2).await;

    first.close(None).await.unwrap();
    wait_for_subscribers(&state, 1).await;

    client
        .add_notification(&NewNotification {
            title: "Still delivered".to_string(),
            message: "One listener left".to_string(),
            kind: NotificationKind::Info,
            action_url: None,
        })
        .await
        .unwrap();

    let pushed = next_notification(&mut second).await;
    assert_eq!(pushed.title, "Still delivered");

    // The feed itself is untouched by the disconnect.
    let feed = client.fetch_notifications().await.unwrap();
    assert_eq!(feed.notifications.len(), 1);
    assert_eq!(feed.unread_count, 1);
}
