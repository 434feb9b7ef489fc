//! Single-client line feed server
//!
//! The LineFeedServer binds a listener, accepts exactly one peer and streams
//! the phrase list to it until the peer goes away or shutdown is requested.
//!
//! ## Lifecycle
//!
//! ```text
//! Unbound ──bind()──▶ Bound ──accept()──▶ Connected ──stream()──▶ Streaming
//!    │                  │                                             │
//!    └──(bind error)────┴──(accept error)──────▶ Terminated ◀────────┘
//!                                                 (write error or shutdown)
//! ```
//!
//! Each operation is valid in exactly one state. A second `accept()` is an
//! `InvalidState` error, so the server can never serve more than one peer.
//! `Terminated` is final: nothing is retried.

mod events;

pub use events::ServerEvent;
pub(crate) use events::EventSender;

use crate::config::LineFeedConfig;
use crate::emitter::{Emitter, Shutdown, StreamSummary};
use crate::error::{Error, Result};
use std::fmt;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Server lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerState {
    /// No socket yet
    Unbound,
    /// Listening, no peer yet
    Bound,
    /// Peer accepted, nothing sent yet
    Connected,
    /// Emit loop running
    Streaming,
    /// Stopped for good
    Terminated,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unbound => "unbound",
            Self::Bound => "bound",
            Self::Connected => "connected",
            Self::Streaming => "streaming",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Single-client TCP line feed
///
/// ## Ownership
///
/// The listener and the accepted connection are owned by the server for its
/// whole life. Neither is closed explicitly; both are released on drop.
pub struct LineFeedServer {
    /// Feed configuration
    config: LineFeedConfig,

    /// Current lifecycle state
    state: ServerState,

    /// Listening socket (kept after accept, never accepted on again)
    listener: Option<TcpListener>,

    /// The one accepted peer
    connection: Option<(TcpStream, SocketAddr)>,

    /// Event sender for external monitoring
    events: EventSender,
}

impl LineFeedServer {
    /// Create a new server
    ///
    /// # Returns
    ///
    /// A tuple of (server, event_receiver) where event_receiver yields server events
    pub fn new(config: LineFeedConfig) -> Result<(Self, mpsc::Receiver<ServerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let server = Self {
            config,
            state: ServerState::Unbound,
            listener: None,
            connection: None,
            events: EventSender::new(tx),
        };

        Ok((server, rx))
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Configuration the server was built with
    pub fn config(&self) -> &LineFeedConfig {
        &self.config
    }

    /// Address the listener is bound to, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Address of the accepted peer, once connected
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.connection.as_ref().map(|(_, peer)| *peer)
    }

    /// Bind the listening socket
    ///
    /// A bind failure is fatal: the server moves to `Terminated`.
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        self.expect_state("bind", ServerState::Unbound)?;

        let addr = self.config.bind_addr();
        let bound = TcpListener::bind(&addr)
            .await
            .and_then(|listener| Ok((listener.local_addr()?, listener)));

        let (local, listener) = match bound {
            Ok(bound) => bound,
            Err(e) => return Err(self.fail(Error::bind(addr, e))),
        };

        self.listener = Some(listener);
        self.transition(ServerState::Bound);
        info!("Waiting for a client on {}", local);
        self.events.emit(ServerEvent::Bound { addr: local });

        Ok(local)
    }

    /// Wait for the single peer
    ///
    /// Blocks without timeout. An accept failure is fatal.
    pub async fn accept(&mut self) -> Result<SocketAddr> {
        self.accept_until(&mut Shutdown::never())
            .await?
            .ok_or_else(|| Error::Other("accept interrupted".to_string()))
    }

    /// Wait for the single peer, or for `shutdown`
    ///
    /// Returns `Ok(None)` if shutdown fired first; the server is then
    /// `Terminated`.
    async fn accept_until(&mut self, shutdown: &mut Shutdown) -> Result<Option<SocketAddr>> {
        self.expect_state("accept", ServerState::Bound)?;

        let Some(listener) = self.listener.as_ref() else {
            return Err(Error::invalid_state("accept", self.state));
        };

        let outcome = tokio::select! {
            accepted = listener.accept() => Ok(accepted),
            reason = shutdown.wait() => Err(reason),
        };

        let (socket, peer) = match outcome {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(e)) => return Err(self.fail(Error::Accept(e))),
            Err(reason) => {
                info!("Shutdown requested ({}) before a client connected", reason);
                self.transition(ServerState::Terminated);
                self.events.emit(ServerEvent::Stopped {
                    reason: reason.to_string(),
                    lines_sent: 0,
                });
                return Ok(None);
            }
        };

        info!("Connection established with {}", peer);
        self.connection = Some((socket, peer));
        self.transition(ServerState::Connected);
        self.events.emit(ServerEvent::PeerConnected { peer });

        Ok(Some(peer))
    }

    /// Stream the phrase list to the peer
    ///
    /// Runs until a write fails (`Err`) or `shutdown` fires (`Ok`). Either
    /// way the server ends `Terminated`.
    pub async fn stream(&mut self, mut shutdown: Shutdown) -> Result<StreamSummary> {
        self.expect_state("stream", ServerState::Connected)?;

        let emitter = Emitter::new(self.config.phrases.clone(), self.config.delay())
            .with_event_sender(self.events.clone());

        let Some((socket, peer)) = self.connection.as_mut() else {
            return Err(Error::invalid_state("stream", self.state));
        };

        debug!("State transition: {} -> {}", self.state, ServerState::Streaming);
        self.state = ServerState::Streaming;

        let result = emitter.run(socket, Some(*peer), &mut shutdown).await;

        debug!("State transition: {} -> {}", self.state, ServerState::Terminated);
        self.state = ServerState::Terminated;
        result
    }

    /// Run the whole lifecycle, stopping on Ctrl-C
    ///
    /// Binds if not yet bound, accepts the peer if not yet connected, then
    /// streams.
    pub async fn run(&mut self) -> Result<StreamSummary> {
        self.run_with_shutdown(None).await
    }

    /// Run the whole lifecycle with a programmatic shutdown signal
    ///
    /// # Parameters
    ///
    /// - `shutdown_rx`: Fires shutdown when sent to or dropped. `None` waits
    ///   for Ctrl-C instead, like [`LineFeedServer::run()`].
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<StreamSummary> {
        let mut shutdown = Shutdown::from(shutdown_rx);

        if self.state == ServerState::Unbound {
            self.bind().await?;
        }

        if self.state == ServerState::Bound && self.accept_until(&mut shutdown).await?.is_none() {
            return Ok(StreamSummary {
                lines_sent: 0,
                next_index: 0,
                reason: shutdown.wait().await.to_string(),
            });
        }

        self.stream(shutdown).await
    }

    fn expect_state(&self, operation: &'static str, expected: ServerState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::invalid_state(operation, self.state))
        }
    }

    fn transition(&mut self, next: ServerState) {
        debug!("State transition: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Record a fatal error and move to `Terminated`
    fn fail(&mut self, err: Error) -> Error {
        error!("{}", err);
        self.transition(ServerState::Terminated);
        self.events.emit(ServerEvent::Failed {
            error: err.to_string(),
            lines_sent: 0,
        });
        err
    }
}
