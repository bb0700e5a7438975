use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use chatvisor::{
    Config, ConnectionState, FileHistory, HistorySource, ReadSupervisor, StatusBus, StatusEvent,
    TcpConnector,
};

/// `[DD.MM.YY HH:MM] ` prefix check without pulling in a regex engine.
fn assert_stamped(record: &str, line: &str) {
    let (stamp, rest) = record.split_at(17);
    assert_eq!(rest, line, "record {record:?}");
    let bytes = stamp.as_bytes();
    assert_eq!(bytes[0], b'[');
    assert_eq!(&stamp[15..], "] ");
    for (i, b) in bytes[1..15].iter().enumerate() {
        match i {
            2 | 5 => assert_eq!(*b, b'.'),
            8 => assert_eq!(*b, b' '),
            11 => assert_eq!(*b, b':'),
            _ => assert!(b.is_ascii_digit(), "stamp {stamp:?}"),
        }
    }
}

#[tokio::test]
async fn ping_reaches_queue_and_history() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        sock.write_all(b"Ping\n").await.unwrap();
        // Hold the connection open until the test is done with it.
        tokio::time::sleep(Duration::from_secs(3)).await;
    });

    let dir = tempfile::tempdir().unwrap();
    let history = Arc::new(FileHistory::new(dir.path().join("history.txt")));
    let cfg = Config {
        host: "127.0.0.1".into(),
        read_port: port,
        ..Config::default()
    };
    let (inbound_tx, mut inbound) = mpsc::unbounded_channel();
    let (bus, mut status) = StatusBus::new();
    let sup = ReadSupervisor::new(&cfg, Arc::new(TcpConnector), inbound_tx, history.clone(), bus);
    let token = CancellationToken::new();
    let handle = tokio::spawn(sup.run(token.clone()));

    assert_eq!(
        status.recv().await,
        Some(StatusEvent::ReadStateChanged(ConnectionState::Established))
    );
    assert_eq!(inbound.recv().await.as_deref(), Some("Ping\n"));

    let mut stored = String::new();
    for _ in 0..100 {
        stored = history.load().await.unwrap();
        if !stored.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_stamped(&stored, "Ping\n");

    token.cancel();
    handle.await.unwrap();
    assert_eq!(
        status.recv().await,
        Some(StatusEvent::ReadStateChanged(ConnectionState::Closed))
    );
    server.abort();
}

#[tokio::test]
async fn refused_connection_reports_initiated() {
    // Bind then drop to obtain a port nobody listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let cfg = Config {
        host: "127.0.0.1".into(),
        read_port: port,
        ..Config::default()
    };
    let (inbound_tx, mut inbound) = mpsc::unbounded_channel();
    let (bus, mut status) = StatusBus::new();
    let sup = ReadSupervisor::new(
        &cfg,
        Arc::new(TcpConnector),
        inbound_tx,
        Arc::new(chatvisor::NoHistory),
        bus,
    );
    let token = CancellationToken::new();
    let handle = tokio::spawn(sup.run(token.clone()));

    assert_eq!(
        status.recv().await,
        Some(StatusEvent::ReadStateChanged(ConnectionState::Initiated))
    );
    assert_eq!(
        inbound.recv().await.as_deref(),
        Some("No connection to the chat. Retrying in 3 sec...\n")
    );

    // Cancellation interrupts the backoff sleep.
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("supervisor ignored cancellation")
        .unwrap();
}
