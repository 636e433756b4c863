//! # Error Types
//!
//! Error handling for the packet hook pipeline.
//!
//! The pipeline has very few failure modes of its own. Most errors that reach a
//! caller of a dispatch entry point were raised by a plugin handler and are
//! passed through untouched, so the transport layer can decide whether to drop
//! the packet or treat the failure as fatal.
//!
//! ## Error Categories
//! - **Codec Errors**: Encoding or decoding a payload failed
//! - **Plugin Errors**: A registered handler returned an error
//! - **Registration Errors**: A channel is full or its handler list is poisoned
//! - **Configuration Errors**: Invalid or unreadable configuration
//!
//! ## Example Usage
//! ```rust
//! use packet_hooks::core::serialization::{decode, encode};
//! use packet_hooks::error::{HookError, Result};
//! use tracing::{error, info};
//!
//! fn roundtrip(value: &str) -> Result<String> {
//!     let bytes = encode(&value.to_string())?;
//!     decode(&bytes)
//! }
//!
//! match roundtrip("hello") {
//!     Ok(value) => info!(value, "Decoded"),
//!     Err(HookError::DecodeError(e)) => error!(error = %e, "Corrupt payload"),
//!     Err(e) => error!(error = %e, "Codec failure"),
//! }
//! ```

use crate::core::packet::PacketKind;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Channel-related error messages
    pub const ERR_CHANNEL_WRITE_LOCK: &str = "Failed to acquire write lock on hook channel";
    pub const ERR_CHANNEL_READ_LOCK: &str = "Failed to acquire read lock on hook channel";

    /// Codec errors
    pub const ERR_EMPTY_INPUT: &str = "Empty data";
    pub const ERR_UNKNOWN_FORMAT: &str = "Unknown format byte";

    /// Logging errors
    pub const ERR_LOGGING_INIT: &str = "Failed to install tracing subscriber";
}

// HookError is the primary error type for all pipeline operations
#[derive(Error, Debug)]
pub enum HookError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Encode error: {0}")]
    EncodeError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Plugin handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Channel {kind} is full ({limit} handlers)")]
    CapacityExceeded { kind: PacketKind, limit: usize },

    #[error("Synchronization primitive poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HookError {
    /// Wrap an arbitrary plugin error, keeping it as the error source.
    pub fn handler<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HookError::Handler(Box::new(err))
    }
}

/// Type alias for Results using HookError
pub type Result<T> = std::result::Result<T, HookError>;
