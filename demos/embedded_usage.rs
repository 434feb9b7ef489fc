//! Minimal embedding example for linefeed-core
//!
//! Runs a feed on an ephemeral port with a short payload, reads a few lines
//! back the way a streaming consumer would, then stops the feed.

use linefeed_core::{LineFeedConfig, LineFeedServer, PhraseList, Result, ServerEvent};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let phrases = PhraseList::new([
        "hello world",
        "Le garçon voit le ballon",
        "L'éléphant aime le jardin",
    ])?;

    let config = LineFeedConfig::new()
        .with_addr("127.0.0.1", 0)
        .with_delay(Duration::from_millis(250))
        .with_phrases(phrases);

    let (mut server, events) = LineFeedServer::new(config)?;
    let addr = server.bind().await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let feed = tokio::spawn(async move { server.run_with_shutdown(Some(shutdown_rx)).await });

    // Consumer side
    let stream = TcpStream::connect(addr).await?;
    let mut lines = BufReader::new(stream).lines();
    for _ in 0..5 {
        match lines.next_line().await? {
            Some(line) => info!("Received: {}", line),
            None => break,
        }
    }

    let _ = shutdown_tx.send(());
    let summary = feed
        .await
        .map_err(|e| linefeed_core::Error::Other(e.to_string()))??;
    info!("Feed stopped after {} line(s)", summary.lines_sent);

    // Events were buffered while the feed ran
    let sent = ReceiverStream::new(events)
        .filter(|e| matches!(e, ServerEvent::LineSent { .. }))
        .fold(0usize, |n, _| n + 1)
        .await;
    info!("{} LineSent event(s) observed", sent);

    Ok(())
}
