use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use chatvisor::{
    Client, Config, ConnectionState, HistoryRecord, HistorySink, HistorySource, RuntimeError,
    StatusEvent,
};

async fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// History kept in memory: a fixed replay blob plus every appended line.
struct MemoryHistory {
    seed: String,
    lines: Mutex<Vec<String>>,
}

#[async_trait]
impl HistorySink for MemoryHistory {
    async fn append(&self, record: &HistoryRecord) -> io::Result<()> {
        self.lines.lock().unwrap().push(record.line.clone());
        Ok(())
    }
}

#[async_trait]
impl HistorySource for MemoryHistory {
    async fn load(&self) -> io::Result<String> {
        Ok(self.seed.clone())
    }
}

#[tokio::test]
async fn history_replay_precedes_live_lines_and_shutdown_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.txt");
    std::fs::write(&path, "Hello\nWorld\n").unwrap();

    let (read_listener, read_port) = listener().await;
    let (write_listener, write_port) = listener().await;
    let read_server = tokio::spawn(async move {
        let (mut sock, _) = read_listener.accept().await.unwrap();
        sock.write_all(b"Ping\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });
    let write_server = tokio::spawn(async move {
        let (mut sock, _) = write_listener.accept().await.unwrap();
        sock.write_all(b"greeting\n").await.unwrap();
        let mut buf = [0u8; 64];
        let _ = tokio::io::AsyncReadExt::read(&mut sock, &mut buf).await;
        sock.write_all(b"{\"nickname\":\"Ann\"}\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });

    let cfg = Config {
        host: "127.0.0.1".into(),
        read_port,
        write_port,
        token: Some("t".into()),
        history_path: Some(path.clone()),
        grace: Duration::from_secs(2),
        ..Config::default()
    };
    let (engine, mut presenter) = chatvisor::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let client = tokio::spawn(Client::new(cfg).run_until(engine, async {
        let _ = stop_rx.await;
    }));

    assert_eq!(
        presenter.inbound.recv().await.as_deref(),
        Some("Hello\nWorld\n")
    );
    assert_eq!(presenter.inbound.recv().await.as_deref(), Some("Ping\n"));

    let mut seen = Vec::new();
    while !seen.contains(&StatusEvent::NicknameReceived("Ann".into())) {
        seen.push(presenter.status.recv().await.unwrap());
    }
    assert!(seen.contains(&StatusEvent::ReadStateChanged(ConnectionState::Established)));
    assert!(seen.contains(&StatusEvent::SendStateChanged(ConnectionState::Established)));

    stop_tx.send(()).unwrap();
    assert!(client.await.unwrap().is_ok());

    let mut tail = Vec::new();
    while let Some(ev) = presenter.status.recv().await {
        tail.push(ev);
    }
    assert!(tail.contains(&StatusEvent::ReadStateChanged(ConnectionState::Closed)));
    assert!(tail.contains(&StatusEvent::SendStateChanged(ConnectionState::Closed)));

    read_server.abort();
    write_server.abort();
}

#[tokio::test]
async fn invalid_token_stops_the_client() {
    let (read_listener, read_port) = listener().await;
    let (write_listener, write_port) = listener().await;
    let _read_server = tokio::spawn(async move {
        let _conn = read_listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });
    tokio::spawn(async move {
        let (mut sock, _) = write_listener.accept().await.unwrap();
        sock.write_all(b"greeting\n").await.unwrap();
        let mut buf = [0u8; 64];
        let _ = tokio::io::AsyncReadExt::read(&mut sock, &mut buf).await;
        sock.write_all(b"null\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });

    let cfg = Config {
        host: "127.0.0.1".into(),
        read_port,
        write_port,
        token: Some("stale".into()),
        history_path: None,
        ..Config::default()
    };
    let (engine, _presenter) = chatvisor::channel();
    let res = tokio::time::timeout(
        Duration::from_secs(2),
        Client::new(cfg).run_until(engine, std::future::pending()),
    )
    .await
    .expect("client kept running after token rejection");

    assert!(matches!(res, Err(RuntimeError::Unauthorized)));
}

#[tokio::test]
async fn custom_history_store_replays_and_records() {
    let (read_listener, read_port) = listener().await;
    let (write_listener, write_port) = listener().await;
    let read_server = tokio::spawn(async move {
        let (mut sock, _) = read_listener.accept().await.unwrap();
        sock.write_all(b"Ping\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });
    let write_server = tokio::spawn(async move {
        let _conn = write_listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
    });

    let store = Arc::new(MemoryHistory {
        seed: "Earlier\n".into(),
        lines: Mutex::new(Vec::new()),
    });
    let cfg = Config {
        host: "127.0.0.1".into(),
        read_port,
        write_port,
        token: Some("t".into()),
        history_path: None,
        grace: Duration::from_secs(2),
        ..Config::default()
    };
    let (engine, mut presenter) = chatvisor::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let client = Client::new(cfg).with_history(store.clone(), store.clone());
    let client = tokio::spawn(client.run_until(engine, async {
        let _ = stop_rx.await;
    }));

    assert_eq!(presenter.inbound.recv().await.as_deref(), Some("Earlier\n"));
    assert_eq!(presenter.inbound.recv().await.as_deref(), Some("Ping\n"));

    stop_tx.send(()).unwrap();
    assert!(client.await.unwrap().is_ok());
    assert_eq!(*store.lines.lock().unwrap(), ["Ping\n"]);

    read_server.abort();
    write_server.abort();
}
