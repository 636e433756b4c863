//! # Binary Codec
//!
//! Generic serialize/deserialize of arbitrary payload objects to and from a
//! byte sequence. Plugins use it to move structured data across the wire or
//! to storage; the hook pipeline itself never inspects the byte layout.
//!
//! The default codec is bincode: length-prefixed and driven entirely by the
//! serde schema of `T`. JSON (debugging/interop) and MessagePack (compact)
//! are available through [`MultiFormat`].
//!
//! ## Guarantees
//! - `decode(encode(v)) == v` for every representable `v`
//! - Truncated, malformed or type-mismatched input fails with
//!   [`HookError::DecodeError`]; no partially populated value is returned
//! - Trailing bytes after a complete value are rejected
//! - Inputs claiming more than [`MAX_PAYLOAD_SIZE`] bytes are rejected before
//!   allocation
//!
//! ## Usage
//! ```rust
//! use packet_hooks::core::serialization::{decode, encode};
//!
//! let bytes = encode(&(42u32, "spawn".to_string())).unwrap();
//! let (id, name): (u32, String) = decode(&bytes).unwrap();
//! assert_eq!((id, name.as_str()), (42, "spawn"));
//! ```

use crate::config::MAX_PAYLOAD_SIZE;
use crate::error::{constants, HookError, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[inline]
fn bincode_options(limit: usize) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(limit as u64)
        .reject_trailing_bytes()
}

/// Serialize a value with the default binary codec.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    encode_with_limit(value, MAX_PAYLOAD_SIZE)
}

/// Deserialize a value produced by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    decode_with_limit(bytes, MAX_PAYLOAD_SIZE)
}

/// [`encode`] with an explicit size ceiling in bytes.
pub fn encode_with_limit<T: Serialize + ?Sized>(value: &T, limit: usize) -> Result<Vec<u8>> {
    bincode_options(limit)
        .serialize(value)
        .map_err(|e| HookError::EncodeError(e.to_string()))
}

/// [`decode`] with an explicit size ceiling in bytes.
pub fn decode_with_limit<T: DeserializeOwned>(bytes: &[u8], limit: usize) -> Result<T> {
    bincode_options(limit)
        .deserialize(bytes)
        .map_err(|e| HookError::DecodeError(e.to_string()))
}

/// Supported serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    /// Binary compact format (default, fastest)
    #[default]
    Bincode,
    /// Human-readable JSON format (debugging, interop)
    Json,
    /// Compact binary format (MessagePack, efficient)
    MessagePack,
}

impl SerializationFormat {
    /// Get the format identifier byte for wire protocol
    pub fn format_byte(self) -> u8 {
        match self {
            SerializationFormat::Bincode => 0x01,
            SerializationFormat::Json => 0x02,
            SerializationFormat::MessagePack => 0x03,
        }
    }

    /// Detect format from identifier byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(SerializationFormat::Bincode),
            0x02 => Some(SerializationFormat::Json),
            0x03 => Some(SerializationFormat::MessagePack),
            _ => None,
        }
    }

    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            SerializationFormat::Bincode => "Bincode",
            SerializationFormat::Json => "JSON",
            SerializationFormat::MessagePack => "MessagePack",
        }
    }
}

/// Trait for types that support multiple serialization formats
pub trait MultiFormat: Serialize + DeserializeOwned + Sized {
    /// Serialize to bytes using the specified format
    fn serialize_format(&self, format: SerializationFormat) -> Result<Vec<u8>> {
        match format {
            SerializationFormat::Bincode => encode(self),
            SerializationFormat::Json => {
                serde_json::to_vec(self).map_err(|e| HookError::EncodeError(e.to_string()))
            }
            SerializationFormat::MessagePack => {
                rmp_serde::to_vec(self).map_err(|e| HookError::EncodeError(e.to_string()))
            }
        }
    }

    /// Serialize to bytes with format header
    fn serialize_with_header(&self, format: SerializationFormat) -> Result<Vec<u8>> {
        let mut data = vec![format.format_byte()];
        let mut payload = self.serialize_format(format)?;
        data.append(&mut payload);
        Ok(data)
    }

    /// Deserialize from bytes using the specified format
    fn deserialize_format(data: &[u8], format: SerializationFormat) -> Result<Self> {
        match format {
            SerializationFormat::Bincode => decode(data),
            SerializationFormat::Json => {
                serde_json::from_slice(data).map_err(|e| HookError::DecodeError(e.to_string()))
            }
            SerializationFormat::MessagePack => {
                rmp_serde::from_slice(data).map_err(|e| HookError::DecodeError(e.to_string()))
            }
        }
    }

    /// Deserialize from bytes with format header
    fn deserialize_with_header(data: &[u8]) -> Result<(Self, SerializationFormat)> {
        let (&first, rest) = data
            .split_first()
            .ok_or_else(|| HookError::DecodeError(constants::ERR_EMPTY_INPUT.to_string()))?;

        let format = SerializationFormat::from_byte(first).ok_or_else(|| {
            HookError::DecodeError(format!("{}: {first}", constants::ERR_UNKNOWN_FORMAT))
        })?;

        let value = Self::deserialize_format(rest, format)?;
        Ok((value, format))
    }
}

impl<T: Serialize + DeserializeOwned> MultiFormat for T {}
