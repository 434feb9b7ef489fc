//! Test helpers shared by the contract tests
//!
//! A feed is started on an ephemeral loopback port and read back by a plain
//! TCP client, the way a downstream consumer would read it.

#![allow(dead_code)]

use linefeed_core::{LineFeedConfig, LineFeedServer, PhraseList, ServerEvent, StreamSummary};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Upper bound for any single wait in these tests
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A running feed and the handles to control it
pub struct RunningFeed {
    /// Address the feed listens on
    pub addr: SocketAddr,
    /// Server task; resolves when the feed stops
    pub handle: JoinHandle<linefeed_core::Result<StreamSummary>>,
    /// Send to request shutdown (dropping it also requests shutdown)
    pub shutdown_tx: oneshot::Sender<()>,
    /// Server events
    pub events: mpsc::Receiver<ServerEvent>,
}

impl RunningFeed {
    /// Request shutdown and wait for the feed to stop
    pub async fn stop(self) -> linefeed_core::Result<StreamSummary> {
        let _ = self.shutdown_tx.send(());
        tokio::time::timeout(TEST_TIMEOUT, self.handle)
            .await
            .expect("feed stops within the timeout")
            .expect("feed task does not panic")
    }
}

/// Config on an ephemeral loopback port with the given payload and delay
pub fn test_config(phrases: &[&str], delay: Duration) -> LineFeedConfig {
    LineFeedConfig::new()
        .with_addr("127.0.0.1", 0)
        .with_delay(delay)
        .with_phrases(PhraseList::new(phrases.iter().copied()).expect("valid phrase list"))
}

/// Bind the feed, then run it in the background
pub async fn start_feed(config: LineFeedConfig) -> RunningFeed {
    let (mut server, events) = LineFeedServer::new(config).expect("valid config");
    let addr = server.bind().await.expect("bind on an ephemeral port");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move { server.run_with_shutdown(Some(shutdown_rx)).await });

    RunningFeed {
        addr,
        handle,
        shutdown_tx,
        events,
    }
}

/// Connect to the feed and return a line reader
pub async fn connect(addr: SocketAddr) -> LineClient {
    let stream = TcpStream::connect(addr).await.expect("connect to feed");
    LineClient {
        reader: BufReader::new(stream),
    }
}

/// Client side of the feed
pub struct LineClient {
    reader: BufReader<TcpStream>,
}

impl LineClient {
    /// Read one raw line, including its trailing `\n`
    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        let n = tokio::time::timeout(TEST_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("line arrives within the timeout")
            .expect("line is valid UTF-8");
        assert!(n > 0, "feed closed the connection early");
        line
    }

    /// Read `n` raw lines
    pub async fn read_lines(&mut self, n: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(n);
        for _ in 0..n {
            lines.push(self.read_line().await);
        }
        lines
    }

    /// Underlying reader, including anything already buffered
    pub fn into_inner(self) -> BufReader<TcpStream> {
        self.reader
    }

    /// Read exactly `len` bytes
    pub async fn read_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        tokio::time::timeout(TEST_TIMEOUT, self.reader.read_exact(&mut buf))
            .await
            .expect("bytes arrive within the timeout")
            .expect("read succeeds");
        buf
    }
}

/// Wire bytes of the first `k` messages for `phrases`, wrapping
pub fn expected_bytes(phrases: &[&str], k: usize) -> Vec<u8> {
    phrases
        .iter()
        .cycle()
        .take(k)
        .flat_map(|p| linefeed_core::encode_line(p))
        .collect()
}
