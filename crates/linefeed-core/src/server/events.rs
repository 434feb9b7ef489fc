//! Server events
//!
//! Observational only: nothing in the server reads them back, and a slow or
//! missing consumer never changes what is written to the peer.

use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Events emitted by the LineFeedServer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Listener bound
    Bound {
        addr: SocketAddr,
    },

    /// The single peer connected
    PeerConnected {
        peer: SocketAddr,
    },

    /// A line was fully written
    LineSent {
        /// 1-based message number
        seq: u64,
        /// Position of the phrase in the list
        index: usize,
        phrase: String,
        sent_at: chrono::DateTime<chrono::Utc>,
    },

    /// Stopped on request
    Stopped {
        reason: String,
        lines_sent: u64,
    },

    /// Stopped on a fatal error
    Failed {
        error: String,
        lines_sent: u64,
    },
}

/// Non-blocking, optional sender for [`ServerEvent`]s
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    tx: Option<mpsc::Sender<ServerEvent>>,
}

impl EventSender {
    pub(crate) fn new(tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn disabled() -> Self {
        Self { tx: None }
    }

    /// Send an event without waiting
    ///
    /// A full channel drops the event with a warning. A closed channel means
    /// nobody is listening, which is fine.
    pub(crate) fn emit(&self, event: ServerEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        if let Err(TrySendError::Full(_)) = tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
