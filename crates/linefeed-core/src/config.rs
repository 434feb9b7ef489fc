//! Configuration types for the line feed
//!
//! Every default reproduces the fixed behavior of the feed: loopback on
//! port 9999, one line every 2 seconds, the built-in phrase list.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::phrases::PhraseList;

/// Default listening host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listening port
pub const DEFAULT_PORT: u16 = 9999;

/// Default pause after each line (in milliseconds)
pub const DEFAULT_DELAY_MS: u64 = 2_000;

/// Upper bound accepted for the delay (one hour)
pub const MAX_DELAY_MS: u64 = 3_600_000;

/// Main line feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineFeedConfig {
    /// Host or IP address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pause after each sent line (in milliseconds)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Lines to stream, in order
    #[serde(default)]
    pub phrases: PhraseList,

    /// Capacity of the observational event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl LineFeedConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            delay_ms: default_delay_ms(),
            phrases: PhraseList::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the host and port to bind
    pub fn with_addr(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the pause after each line
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Replace the phrase list
    pub fn with_phrases(mut self, phrases: PhraseList) -> Self {
        self.phrases = phrases;
        self
    }

    /// Pause after each line
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// `host:port` string handed to the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::config("Host cannot be empty"));
        }

        if self.delay_ms == 0 || self.delay_ms > MAX_DELAY_MS {
            return Err(crate::Error::config(format!(
                "Delay must be between 1 and {MAX_DELAY_MS} ms. Got: {}",
                self.delay_ms
            )));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

impl Default for LineFeedConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_event_channel_capacity() -> usize {
    256
}
