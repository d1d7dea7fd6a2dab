//! Integration tests for the reconnecting transport over a real loopback
//! WebSocket.
//!
//! Each test binds a listener on an ephemeral port and plays the server side
//! by hand with `tokio_tungstenite::accept_async`, so the client's queueing
//! and reconnect behaviour can be observed frame by frame.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use pad_core::{decode_client_message, ClientMessage, ServerMessage};
use pad_touch::infrastructure::transport::event_bus::{
    TOPIC_CONNECTED, TOPIC_DISCONNECTED, TOPIC_MESSAGE,
};
use pad_touch::infrastructure::transport::{
    ConnectionState, TransportConfig, TransportEvent, TransportSession,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const STEP: Duration = Duration::from_secs(5);

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn session_for(port: u16) -> Arc<TransportSession> {
    let mut config = TransportConfig::new("127.0.0.1", port);
    config.reconnect_delay = Duration::from_millis(50);
    Arc::new(TransportSession::new(config))
}

/// Forwards `topic` events into a channel the test can await.
fn watch(session: &TransportSession, topic: &str) -> mpsc::UnboundedReceiver<TransportEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    session.events().subscribe(topic, move |event| {
        let _ = tx.send(event.clone());
    });
    rx
}

async fn next_client_message<S>(ws: &mut S) -> ClientMessage
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let frame = timeout(STEP, ws.next()).await.unwrap().unwrap().unwrap();
        if let Message::Text(text) = frame {
            return decode_client_message(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_messages_queued_offline_arrive_first_and_in_order() {
    // Arrange
    let (listener, port) = bind().await;
    let session = session_for(port);
    let mut connected = watch(&session, TOPIC_CONNECTED);
    session.send(&ClientMessage::Move { dx: 1.0, dy: 0.0 });
    session.send(&ClientMessage::Move { dx: 2.0, dy: 0.0 });
    session.send(&ClientMessage::Move { dx: 3.0, dy: 0.0 });
    assert_eq!(session.queued(), 3);

    // Act
    let task = Arc::clone(&session).start();
    let (stream, _) = timeout(STEP, listener.accept()).await.unwrap().unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    let event = timeout(STEP, connected.recv()).await.unwrap().unwrap();
    session.send(&ClientMessage::Click);

    // Assert
    assert!(matches!(event, TransportEvent::Connected { .. }));
    assert_eq!(session.state(), ConnectionState::Connected);
    let mut received = Vec::new();
    for _ in 0..4 {
        received.push(next_client_message(&mut ws).await);
    }
    assert_eq!(
        received,
        vec![
            ClientMessage::Move { dx: 1.0, dy: 0.0 },
            ClientMessage::Move { dx: 2.0, dy: 0.0 },
            ClientMessage::Move { dx: 3.0, dy: 0.0 },
            ClientMessage::Click,
        ]
    );
    assert_eq!(session.queued(), 0);

    session.shutdown();
    let _ = timeout(STEP, task).await;
}

#[tokio::test]
async fn test_reconnects_after_server_close_and_flushes_gap() {
    // Arrange: first connection.
    let (listener, port) = bind().await;
    let session = session_for(port);
    let mut connected = watch(&session, TOPIC_CONNECTED);
    let mut disconnected = watch(&session, TOPIC_DISCONNECTED);
    let task = Arc::clone(&session).start();
    let (stream, _) = timeout(STEP, listener.accept()).await.unwrap().unwrap();
    let mut first = accept_async(stream).await.unwrap();
    timeout(STEP, connected.recv()).await.unwrap().unwrap();

    // Act: server closes; client queues during the gap, then reconnects.
    assert_ok!(first.close(None).await);
    timeout(STEP, disconnected.recv()).await.unwrap().unwrap();
    session.send(&ClientMessage::DragStart);
    session.send(&ClientMessage::DragEnd);
    let (stream, _) = timeout(STEP, listener.accept()).await.unwrap().unwrap();
    let mut second = accept_async(stream).await.unwrap();
    timeout(STEP, connected.recv()).await.unwrap().unwrap();

    // Assert
    assert_eq!(next_client_message(&mut second).await, ClientMessage::DragStart);
    assert_eq!(next_client_message(&mut second).await, ClientMessage::DragEnd);

    session.shutdown();
    let _ = timeout(STEP, task).await;
}

#[tokio::test]
async fn test_server_messages_are_published_by_type() {
    // Arrange
    let (listener, port) = bind().await;
    let session = session_for(port);
    let mut connected = watch(&session, TOPIC_CONNECTED);
    let mut app_lists = watch(&session, "appList");
    let mut all = watch(&session, TOPIC_MESSAGE);
    let task = Arc::clone(&session).start();
    let (stream, _) = timeout(STEP, listener.accept()).await.unwrap().unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    timeout(STEP, connected.recv()).await.unwrap().unwrap();

    // Act
    assert_ok!(ws.send(Message::Text(r#"{"type":"appList","apps":[]}"#.to_string())).await);

    // Assert
    let expected = TransportEvent::Message(ServerMessage::AppList { apps: vec![] });
    assert_eq!(timeout(STEP, app_lists.recv()).await.unwrap(), Some(expected.clone()));
    assert_eq!(timeout(STEP, all.recv()).await.unwrap(), Some(expected));

    session.shutdown();
    let _ = timeout(STEP, task).await;
}
