//! Packet kinds and the values the transport layer hands to the pipeline.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Kinds of datagram that plugins can hook. The set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketKind {
    /// Generic game data packet
    IncomingPacket,
    /// Latency probe
    Ping,
    /// Server discovery query
    Query,
    /// Request to join the server
    ConnectionApproval,
    /// Peer connection status change
    StatusChange,
}

impl PacketKind {
    /// Every kind, in broker order
    pub const ALL: [PacketKind; 5] = [
        PacketKind::IncomingPacket,
        PacketKind::Ping,
        PacketKind::Query,
        PacketKind::ConnectionApproval,
        PacketKind::StatusChange,
    ];

    /// Static routing name, used in logs and metrics
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            PacketKind::IncomingPacket => "INCOMING_PACKET",
            PacketKind::Ping => "PING",
            PacketKind::Query => "QUERY",
            PacketKind::ConnectionApproval => "CONNECTION_APPROVAL",
            PacketKind::StatusChange => "STATUS_CHANGE",
        }
    }

    /// Whether handlers of this kind may rewrite the message
    #[inline]
    pub fn carries_payload(self) -> bool {
        !matches!(self, PacketKind::Ping | PacketKind::Query)
    }

    /// Whether responses of this kind carry an admission decision
    #[inline]
    pub fn has_secondary(self) -> bool {
        matches!(self, PacketKind::ConnectionApproval)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            PacketKind::IncomingPacket => 0,
            PacketKind::Ping => 1,
            PacketKind::Query => 2,
            PacketKind::ConnectionApproval => 3,
            PacketKind::StatusChange => 4,
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remote endpoint a message came from.
///
/// Owned by the transport layer. The pipeline only ever borrows it for the
/// duration of a dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: u64,
    pub address: SocketAddr,
    pub display_name: Option<String>,
}

impl Peer {
    pub fn new(id: u64, address: SocketAddr) -> Self {
        Self {
            id,
            address,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{name}#{}@{}", self.id, self.address),
            None => write!(f, "#{}@{}", self.id, self.address),
        }
    }
}

/// A decoded datagram, already classified by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub kind: PacketKind,
    pub sequence_channel: u8,
    pub payload: Bytes,
}

impl IncomingMessage {
    pub fn new(kind: PacketKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            sequence_channel: 0,
            payload: payload.into(),
        }
    }

    pub fn on_channel(mut self, sequence_channel: u8) -> Self {
        self.sequence_channel = sequence_channel;
        self
    }

    /// Same message with a replaced payload. Kind and channel are kept.
    pub fn with_payload(&self, payload: impl Into<Bytes>) -> Self {
        Self {
            kind: self.kind,
            sequence_channel: self.sequence_channel,
            payload: payload.into(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
