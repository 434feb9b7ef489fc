//! Line emitter
//!
//! The emit loop: write the current phrase plus `\n`, log it, wait the
//! configured delay, advance to the next phrase, forever.
//!
//! ## Loop
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │                                              │
//!   ▼                                              │
//! write phrase[i] + "\n"  ──(error)──▶ Err(Write)  │
//!   │                                              │
//!   ▼                                              │
//! wait delay  ──(shutdown)──▶ Ok(StreamSummary)    │
//!   │                                              │
//!   └──── i = (i + 1) mod len ─────────────────────┘
//! ```
//!
//! A shutdown request is only observed while waiting. A write that has
//! started always runs to completion or failure.
//!
//! Write failures are returned as-is: there is no retry and no reconnect.

mod shutdown;

pub use shutdown::Shutdown;

use crate::error::{Error, Result};
use crate::phrases::{PhraseList, encode_line};
use crate::server::{EventSender, ServerEvent};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Outcome of an emit loop that ended on shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    /// Number of lines fully written
    pub lines_sent: u64,

    /// Index of the phrase that would have been sent next
    pub next_index: usize,

    /// Why the loop stopped
    pub reason: String,
}

/// Streams a phrase list to a writer at a fixed pace
#[derive(Debug, Clone)]
pub struct Emitter {
    /// Lines to send, in order
    phrases: PhraseList,

    /// Pause after each line
    delay: Duration,

    /// Observational event channel
    events: EventSender,
}

impl Emitter {
    /// Create an emitter for `phrases`, pausing `delay` after each line
    pub fn new(phrases: PhraseList, delay: Duration) -> Self {
        Self {
            phrases,
            delay,
            events: EventSender::disabled(),
        }
    }

    /// Report `LineSent`, `Stopped` and `Failed` events on `tx`
    pub fn with_events(mut self, tx: mpsc::Sender<ServerEvent>) -> Self {
        self.events = EventSender::new(tx);
        self
    }

    pub(crate) fn with_event_sender(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Pause after each line
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run the emit loop on `writer` until a write fails or `shutdown` fires
    ///
    /// # Parameters
    ///
    /// - `writer`: Destination of the lines (the peer socket in production)
    /// - `peer`: Peer address, used in logs and errors only
    /// - `shutdown`: Cancellation signal, checked between lines
    ///
    /// # Returns
    ///
    /// - `Ok(StreamSummary)`: Shutdown was requested
    /// - `Err(Error::Write)`: A write failed; the loop does not continue
    pub async fn run<W>(
        &self,
        writer: &mut W,
        peer: Option<SocketAddr>,
        shutdown: &mut Shutdown,
    ) -> Result<StreamSummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut index = 0usize;
        let mut lines_sent = 0u64;

        loop {
            let (phrase, next_index) = self.phrases.next_phrase(index);
            let seq = lines_sent + 1;

            if let Err(source) = write_line(writer, phrase).await {
                let err = Error::write(seq, peer, source);
                error!("Stopping feed after {} line(s): {}", lines_sent, err);
                self.events.emit(ServerEvent::Failed {
                    error: err.to_string(),
                    lines_sent,
                });
                return Err(err);
            }

            lines_sent = seq;
            info!("Sent: {}", phrase);
            self.events.emit(ServerEvent::LineSent {
                seq,
                index,
                phrase: phrase.to_string(),
                sent_at: chrono::Utc::now(),
            });

            index = next_index;
            if index == 0 {
                debug!("Phrase list exhausted after line {}, wrapping around", seq);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}

                reason = shutdown.wait() => {
                    info!("Shutdown requested ({}), {} line(s) sent", reason, lines_sent);
                    self.events.emit(ServerEvent::Stopped {
                        reason: reason.to_string(),
                        lines_sent,
                    });
                    return Ok(StreamSummary {
                        lines_sent,
                        next_index: index,
                        reason: reason.to_string(),
                    });
                }
            }
        }
    }
}

/// Write one phrase as a full line and flush it
async fn write_line<W>(writer: &mut W, phrase: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(&encode_line(phrase)).await?;
    writer.flush().await
}
