//! # packet-hooks
//!
//! Ordered plugin hook pipeline for a multiplayer game server's transport
//! layer.
//!
//! Incoming datagrams (data packets, pings, discovery queries, connection
//! approvals, status changes) are offered to every registered plugin handler,
//! in registration order, before the server's own protocol logic runs. Each
//! handler can:
//! - stop further plugin processing (`continue_plugins = false`)
//! - stop the server's own processing (`continue_server = false`)
//! - rewrite the payload seen by later handlers and by the server
//!
//! The two flags are independent, so a plugin can silently monitor traffic
//! or silently suppress server behaviour.
//!
//! ## Example
//! ```rust
//! use packet_hooks::{HookBroker, IncomingMessage, PacketKind, PacketResponse};
//!
//! let broker: HookBroker<u64> = HookBroker::new();
//! broker
//!     .on_incoming_packet(|_peer, msg: IncomingMessage| {
//!         Ok(PacketResponse::forward(msg.with_payload("censored")))
//!     })
//!     .unwrap();
//!
//! let msg = IncomingMessage::new(PacketKind::IncomingPacket, "secret");
//! let response = broker.incoming_packet(&7, msg).unwrap();
//! assert!(response.continue_server);
//! assert_eq!(&response.payload.payload[..], b"censored");
//! ```
//!
//! ## Modules
//! - [`protocol`]: responses, channels, broker, server hand-off
//! - [`core`]: packet kinds, peers, messages, binary codec
//! - [`config`]: TOML/env configuration
//! - [`utils`]: logging and metrics

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::core::packet::{IncomingMessage, PacketKind, Peer};
pub use crate::error::{HookError, Result};
pub use crate::protocol::broker::{HookBroker, Outcome};
pub use crate::protocol::channel::{EventChannel, SignalChannel};
pub use crate::protocol::intake::{deliver, Delivery, ServerProtocol};
pub use crate::protocol::response::{
    ApprovalResponse, PacketResponse, Response, SignalResponse,
};
