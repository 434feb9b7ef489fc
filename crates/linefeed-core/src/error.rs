//! Error types for the line feed
//!
//! Every variant except `Config` and `InvalidState` is terminal for the
//! server: there is no retry or reconnect path.

use std::net::SocketAddr;
use thiserror::Error;

use crate::server::ServerState;

/// Result type alias for line feed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the line feed
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation was called in a state that does not allow it
    #[error("Invalid server state: cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the server was in
        state: ServerState,
    },

    /// The listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Accepting the single peer failed
    #[error("Failed to accept a peer: {0}")]
    Accept(#[source] std::io::Error),

    /// Writing a line to the peer failed
    #[error("Failed to write line {seq} to peer {peer}: {source}")]
    Write {
        /// 1-based message number of the failed write
        seq: u64,
        /// Peer description (address, or the sink for non-socket writers)
        peer: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Other I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(operation: &'static str, state: ServerState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Create a bind error
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Create a write error for message `seq`
    pub fn write(seq: u64, peer: Option<SocketAddr>, source: std::io::Error) -> Self {
        Self::Write {
            seq,
            peer: peer.map_or_else(|| "<sink>".to_string(), |addr| addr.to_string()),
            source,
        }
    }

    /// Whether this error ends the server's life
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::InvalidState { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
