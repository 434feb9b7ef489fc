//! Cancellation signal for the accept wait and the emit loop.

use std::io;
use tokio::sync::oneshot;
use tracing::warn;

/// Shutdown signal
///
/// Once fired, every later `wait()` resolves immediately with the same reason.
#[derive(Debug)]
pub enum Shutdown {
    /// Never fires; the loop ends only on a write failure
    Never,

    /// Fires when the sender sends or is dropped
    Signal(oneshot::Receiver<()>),

    /// Fires on Ctrl-C
    ///
    /// The listener is installed on the first `wait()` and kept until the
    /// signal fires, so an interrupt between two waits is not lost.
    CtrlC(Option<Interrupt>),

    /// Already fired
    Fired(&'static str),
}

impl Shutdown {
    /// A signal that never fires
    pub fn never() -> Self {
        Self::Never
    }

    /// A signal driven by a oneshot channel
    pub fn signal(rx: oneshot::Receiver<()>) -> Self {
        Self::Signal(rx)
    }

    /// A signal driven by Ctrl-C
    pub fn ctrl_c() -> Self {
        Self::CtrlC(None)
    }

    /// Whether the signal has already fired
    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }

    /// Wait for the signal and return a short reason
    ///
    /// Cancel-safe: dropping the future before it completes loses nothing.
    pub async fn wait(&mut self) -> &'static str {
        let reason = match self {
            Self::Never => std::future::pending::<&'static str>().await,
            Self::Signal(rx) => {
                // A dropped sender counts as a shutdown request
                let _ = rx.await;
                "shutdown signal"
            }
            Self::CtrlC(listener) => match Interrupt::recv_on(listener).await {
                Ok(()) => "SIGINT",
                Err(e) => {
                    warn!("Failed to listen for Ctrl-C, graceful shutdown disabled: {}", e);
                    *self = Self::Never;
                    std::future::pending::<&'static str>().await
                }
            },
            Self::Fired(reason) => return *reason,
        };

        *self = Self::Fired(reason);
        reason
    }
}

/// `None` means "shut down on Ctrl-C", matching production behavior
impl From<Option<oneshot::Receiver<()>>> for Shutdown {
    fn from(rx: Option<oneshot::Receiver<()>>) -> Self {
        rx.map_or_else(Self::ctrl_c, Self::Signal)
    }
}

/// Installed Ctrl-C listener
///
/// Deliveries are buffered while nobody is polling it.
#[cfg(unix)]
#[derive(Debug)]
pub struct Interrupt(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Interrupt {
    fn listen() -> io::Result<Self> {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).map(Self)
    }

    async fn recv(&mut self) -> io::Result<()> {
        match self.0.recv().await {
            Some(()) => Ok(()),
            None => Err(io::Error::other("SIGINT stream closed")),
        }
    }
}

/// Installed Ctrl-C listener
///
/// Holds one `ctrl_c()` future for its whole life.
#[cfg(not(unix))]
pub struct Interrupt(
    std::pin::Pin<Box<dyn std::future::Future<Output = io::Result<()>> + Send>>,
);

#[cfg(not(unix))]
impl Interrupt {
    fn listen() -> io::Result<Self> {
        Ok(Self(Box::pin(tokio::signal::ctrl_c())))
    }

    async fn recv(&mut self) -> io::Result<()> {
        self.0.as_mut().await
    }
}

#[cfg(not(unix))]
impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt").finish_non_exhaustive()
    }
}

impl Interrupt {
    /// Install the listener into `slot` if needed, then wait on it
    async fn recv_on(slot: &mut Option<Interrupt>) -> io::Result<()> {
        let interrupt = match slot.take() {
            Some(interrupt) => interrupt,
            None => Self::listen()?,
        };
        slot.insert(interrupt).recv().await
    }
}
