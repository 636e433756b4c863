//! # Core Types
//!
//! Packet kinds, peer handles, decoded messages and the binary payload codec.
//!
//! The transport layer produces [`packet::IncomingMessage`] values and owns
//! the [`packet::Peer`] handles; the hook pipeline only borrows peers and
//! threads messages through plugin handlers.

pub mod packet;
pub mod serialization;
