//! End-to-end tests of the event loop against a fake TV on loopback


use std::time::Duration;

use soap_client::Transport;
use test_helpers::*;
use tokio::time::timeout;
use tokio_test::assert_ok;
use viera_stream::{EventLoop, StreamConfig, Wakeup};

async fn start_loop(renewal_window: Duration) -> (EventLoop<Transport>, u16, tokio::sync::mpsc::UnboundedReceiver<String>) {
    let (control_port, requests) = fake_control_port().await;
    let heartbeat_port = fake_heartbeat_port().await;

    let config = StreamConfig::new()
        .with_listen_port(0)
        .with_heartbeat_port(heartbeat_port)
        .with_renewal_window(renewal_window);

    let event_loop = EventLoop::start(&config, Transport::new(loopback(control_port)))
        .await
        .expect("event loop starts");
    let listen_port = event_loop.server().local_addr().unwrap().port();

    (event_loop, listen_port, requests)
}

#[tokio::test]
async fn test_notification_registers_subscription() {
    let (mut event_loop, listen_port, _requests) = start_loop(Duration::from_secs(290)).await;
    assert!(event_loop.heartbeat().is_connected());
    assert_eq!(event_loop.engine().next_deadline(), None);

    let client = tokio::spawn(send_notify(listen_port, "dmr2", SID_A));

    let wakeup = timeout(Duration::from_secs(5), event_loop.turn())
        .await
        .expect("loop woke")
        .unwrap();
    assert_eq!(wakeup, Wakeup::Notification);
    assert_eq!(client.await.unwrap(), b"HTTP/1.1 200 OK\r\n");

    let entry = event_loop.engine().registry().resolve("dmr2").unwrap();
    assert_eq!(entry.subscription_id(), Some(SID_A));
    assert!(event_loop.engine().next_deadline().is_some());
}

#[tokio::test]
async fn test_deadline_triggers_renewal() {
    let (mut event_loop, listen_port, mut requests) = start_loop(Duration::from_millis(200)).await;

    let client = tokio::spawn(send_notify(listen_port, "nrc0", SID_B));
    let wakeup = timeout(Duration::from_secs(5), event_loop.turn()).await.unwrap().unwrap();
    assert_eq!(wakeup, Wakeup::Notification);
    client.await.unwrap();

    let wakeup = timeout(Duration::from_secs(5), event_loop.turn()).await.unwrap().unwrap();
    assert_eq!(wakeup, Wakeup::Renewal(1));

    let renewal = timeout(Duration::from_secs(5), requests.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(renewal.starts_with("SUBSCRIBE /nrc/event_0 HTTP/1.1\r\n"));
    assert!(renewal.contains(&format!("SID: uuid:{SID_B}\r\n")));
    assert!(!renewal.contains("CALLBACK"));
}

#[tokio::test]
async fn test_subscribe_reaches_control_port() {
    let (event_loop, listen_port, mut requests) = start_loop(Duration::from_secs(290)).await;

    let reply = assert_ok!(
        event_loop
            .engine()
            .subscribe("dmr0", "127.0.0.1", listen_port)
            .await
    );
    assert!(reply.starts_with(b"HTTP/1.1 200 OK"));

    let request = timeout(Duration::from_secs(5), requests.recv()).await.unwrap().unwrap();
    assert!(request.starts_with("SUBSCRIBE /dmr/event_0 HTTP/1.1\r\n"));
    assert!(request.contains(&format!("CALLBACK: <http://127.0.0.1:{listen_port}/dmr0>\r\n")));
    assert!(request.contains("NT: upnp:event\r\n"));
}

#[tokio::test]
async fn test_start_rejects_invalid_config() {
    let config = StreamConfig::new().with_renewal_window(Duration::ZERO);
    let result = EventLoop::start(&config, Transport::new(loopback(1))).await;
    assert!(result.is_err());
}
