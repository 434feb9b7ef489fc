// # linefeed-core
//
// Core library for the single-client TCP line feed.
//
// ## Architecture Overview
//
// - **PhraseList**: Immutable, ordered payload with wrap-around cursor
// - **Emitter**: Write-log-wait loop over any async writer
// - **LineFeedServer**: Bind → accept one peer → stream, as an explicit state machine
// - **LineFeedConfig**: Host, port, delay and payload, with defaults matching the fixed feed
//
// ## Design Principles
//
// 1. **One peer per process**: the server refuses a second accept
// 2. **No recovery**: bind, accept and write failures end the server
// 3. **Single thread of control**: no tasks are spawned, no locks are taken
// 4. **Library-First**: the daemon is a thin wrapper over this crate

pub mod config;
pub mod emitter;
pub mod error;
pub mod phrases;
pub mod server;

// Re-export core types for convenience
pub use config::LineFeedConfig;
pub use emitter::{Emitter, Shutdown, StreamSummary};
pub use error::{Error, Result};
pub use phrases::{DEFAULT_PHRASES, PhraseList, encode_line};
pub use server::{LineFeedServer, ServerEvent, ServerState};
