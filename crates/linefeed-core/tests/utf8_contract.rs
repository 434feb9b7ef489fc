//! Contract Test: UTF-8 Payload
//!
//! Accented letters and the elision apostrophe reach the peer byte for byte.

mod common;

use common::*;
use linefeed_core::{DEFAULT_PHRASES, Emitter, PhraseList, Shutdown};
use std::time::Duration;
use tokio::io::AsyncReadExt;

#[tokio::test]
async fn accented_phrases_round_trip_over_tcp() {
    let phrases = &[
        "Le chien déteste le ballon",
        "Le garçon voit le ballon",
        "L'éléphant aime le jardin",
    ];
    let feed = start_feed(test_config(phrases, Duration::from_millis(5))).await;
    let mut client = connect(feed.addr).await;

    let expected = expected_bytes(phrases, 3);
    let received = client.read_bytes(expected.len()).await;
    assert_eq!(received, expected);

    let text = String::from_utf8(received).expect("valid UTF-8");
    assert!(text.contains('é'));
    assert!(text.contains('ç'));
    assert!(text.contains("L'éléphant"));

    // "é" is 0xC3 0xA9 on the wire, not a single Latin-1 byte
    assert!(expected.windows(2).any(|w| w == [0xC3, 0xA9]));
    assert!(expected.windows(2).any(|w| w == [0xC3, 0xA7]));

    feed.stop().await.expect("clean shutdown");
}

#[tokio::test]
async fn built_in_list_is_sent_verbatim() {
    let (mut client, mut server) = tokio::io::duplex(64 * 1024);
    let emitter = Emitter::new(PhraseList::default(), Duration::from_millis(1));

    let handle = tokio::spawn(async move {
        emitter.run(&mut server, None, &mut Shutdown::never()).await
    });

    // One full pass of the built-in list
    let expected = expected_bytes(DEFAULT_PHRASES, DEFAULT_PHRASES.len());
    let mut received = vec![0u8; expected.len()];
    tokio::time::timeout(TEST_TIMEOUT, client.read_exact(&mut received))
        .await
        .expect("full pass within the timeout")
        .unwrap();

    assert_eq!(received, expected);
    assert!(String::from_utf8(received)
        .unwrap()
        .contains("La voiture apprend l'école\n"));

    drop(client);
    assert!(handle.await.unwrap().is_err());
}
