//! Contract Test: Timing
//!
//! One line per delay interval: the gap between the start of message N and
//! the start of message N+1 is the configured delay, independent of N.
//!
//! The exact checks run on an in-memory pipe with the tokio clock paused, so
//! writes take no time and gaps are exact. The TCP check allows for jitter.

mod common;

use common::*;
use linefeed_core::{Emitter, PhraseList, ServerEvent, Shutdown};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

#[tokio::test(start_paused = true)]
async fn default_delay_spaces_lines_two_seconds_apart() {
    let (client, mut server) = tokio::io::duplex(64 * 1024);
    let emitter = Emitter::new(PhraseList::default(), Duration::from_secs(2));
    assert_eq!(emitter.delay(), Duration::from_secs(2));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move {
        let mut shutdown = Shutdown::signal(shutdown_rx);
        emitter.run(&mut server, None, &mut shutdown).await
    });

    let mut lines = BufReader::new(client).lines();
    let mut arrivals = Vec::new();
    for _ in 0..6 {
        lines.next_line().await.unwrap().expect("line arrives");
        arrivals.push(Instant::now());
    }

    for pair in arrivals.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(2));
    }

    shutdown_tx.send(()).unwrap();
    let summary = handle.await.unwrap().unwrap();
    assert_eq!(summary.lines_sent, 6);
}

#[tokio::test(start_paused = true)]
async fn gap_is_the_same_across_the_wrap() {
    let (client, mut server) = tokio::io::duplex(1024);
    let emitter = Emitter::new(
        PhraseList::new(["a", "b"]).unwrap(),
        Duration::from_millis(750),
    );

    let handle = tokio::spawn(async move {
        emitter.run(&mut server, None, &mut Shutdown::never()).await
    });

    let start = Instant::now();
    let mut lines = BufReader::new(client).lines();
    let mut offsets = Vec::new();
    for _ in 0..5 {
        let line = lines.next_line().await.unwrap().expect("line arrives");
        offsets.push((line, Instant::now() - start));
    }

    let expected: Vec<(String, Duration)> = ["a", "b", "a", "b", "a"]
        .iter()
        .enumerate()
        .map(|(i, p)| (p.to_string(), Duration::from_millis(750) * i as u32))
        .collect();
    assert_eq!(offsets, expected);

    // Closing the reader ends the feed with a write error
    drop(lines);
    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn tcp_lines_arrive_one_delay_apart() {
    let delay = Duration::from_millis(200);
    let feed = start_feed(test_config(&["x", "y", "z"], delay)).await;
    let mut client = connect(feed.addr).await;

    let mut events = ReceiverStream::new(feed.events);
    client.read_lines(4).await;

    let mut stamps = Vec::new();
    while stamps.len() < 4 {
        if let Some(ServerEvent::LineSent { sent_at, .. }) = events.next().await {
            stamps.push(sent_at);
        }
    }

    for pair in stamps.windows(2) {
        let gap = (pair[1] - pair[0]).to_std().expect("timestamps increase");
        assert!(gap >= delay, "gap {gap:?} shorter than delay");
        assert!(gap < delay * 5, "gap {gap:?} far above delay");
    }

    let _ = feed.shutdown_tx.send(());
    let summary = tokio::time::timeout(TEST_TIMEOUT, feed.handle)
        .await
        .expect("feed stops")
        .unwrap()
        .unwrap();
    assert!(summary.lines_sent >= 4);
}
