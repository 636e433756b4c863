//! The hook broker: one channel per packet kind.
//!
//! The broker is an ordinary owned value. The transport layer holds it to
//! dispatch traffic, plugin loading code holds it (usually behind an `Arc`)
//! to register handlers. Several brokers can live in one process.

use crate::config::HookConfig;
use crate::core::packet::{IncomingMessage, PacketKind, Peer};
use crate::error::Result;
use crate::protocol::channel::{EventChannel, SignalChannel};
use crate::protocol::response::{ApprovalResponse, PacketResponse, SignalResponse};
use crate::utils::metrics::{HookMetrics, Timer};
use std::sync::Arc;

/// Result of a kind-addressed dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<M> {
    /// Ping or query. The message is handed back untouched.
    Signal {
        kind: PacketKind,
        response: SignalResponse,
        message: M,
    },
    /// Incoming packet or status change
    Packet {
        kind: PacketKind,
        response: PacketResponse<M>,
    },
    /// Connection approval
    Approval(ApprovalResponse<M>),
}

impl<M> Outcome<M> {
    pub fn kind(&self) -> PacketKind {
        match self {
            Outcome::Signal { kind, .. } | Outcome::Packet { kind, .. } => *kind,
            Outcome::Approval(_) => PacketKind::ConnectionApproval,
        }
    }

    /// Whether the server should still run its built-in handling
    pub fn continue_server(&self) -> bool {
        match self {
            Outcome::Signal { response, .. } => response.continue_server,
            Outcome::Packet { response, .. } => response.continue_server,
            Outcome::Approval(response) => response.continue_server,
        }
    }

    /// A connection approval whose final response denied admission.
    /// Authoritative whatever `continue_server` says.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Approval(response) if !response.secondary)
    }

    /// The message the server should work with, rewritten or not
    pub fn into_message(self) -> M {
        match self {
            Outcome::Signal { message, .. } => message,
            Outcome::Packet { response, .. } => response.payload,
            Outcome::Approval(response) => response.payload,
        }
    }
}

/// Named set of hook channels, one per [`PacketKind`].
pub struct HookBroker<P = Peer, M = IncomingMessage> {
    incoming_packet: EventChannel<P, M>,
    ping: SignalChannel<P, M>,
    query: SignalChannel<P, M>,
    connection_approval: EventChannel<P, M, bool>,
    status_change: EventChannel<P, M>,
    metrics: Arc<HookMetrics>,
}

impl<P, M> Default for HookBroker<P, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, M> HookBroker<P, M> {
    pub fn new() -> Self {
        Self::with_config(&HookConfig::default())
    }

    /// Build a broker whose channels honour `config`.
    ///
    /// The connection-approval chain starts from `secondary = true`, so an
    /// approval with no handlers registered is admitted. This differs from a
    /// zero-initialised flag, which would start every approval as a rejection.
    pub fn with_config(config: &HookConfig) -> Self {
        let metrics = Arc::new(HookMetrics::new());
        Self {
            incoming_packet: EventChannel::with_config(
                PacketKind::IncomingPacket,
                (),
                config,
                Arc::clone(&metrics),
            ),
            ping: SignalChannel::with_config(PacketKind::Ping, config, Arc::clone(&metrics)),
            query: SignalChannel::with_config(PacketKind::Query, config, Arc::clone(&metrics)),
            // Connections are admitted unless a handler says otherwise
            connection_approval: EventChannel::with_config(
                PacketKind::ConnectionApproval,
                true,
                config,
                Arc::clone(&metrics),
            ),
            status_change: EventChannel::with_config(
                PacketKind::StatusChange,
                (),
                config,
                Arc::clone(&metrics),
            ),
            metrics,
        }
    }

    pub fn metrics(&self) -> &HookMetrics {
        &self.metrics
    }

    /// Number of handlers registered for `kind`
    pub fn handler_count(&self, kind: PacketKind) -> usize {
        match kind {
            PacketKind::IncomingPacket => self.incoming_packet.len(),
            PacketKind::Ping => self.ping.len(),
            PacketKind::Query => self.query.len(),
            PacketKind::ConnectionApproval => self.connection_approval.len(),
            PacketKind::StatusChange => self.status_change.len(),
        }
    }

    // ---- registration points -------------------------------------------

    /// Called for every generic data packet. Handlers may rewrite it.
    pub fn on_incoming_packet<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, M) -> Result<PacketResponse<M>> + Send + Sync + 'static,
    {
        self.incoming_packet.register(handler)
    }

    /// Called for every ping.
    pub fn on_ping<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, &M) -> Result<SignalResponse> + Send + Sync + 'static,
    {
        self.ping.register(handler)
    }

    /// Called for every discovery query.
    pub fn on_query<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, &M) -> Result<SignalResponse> + Send + Sync + 'static,
    {
        self.query.register(handler)
    }

    /// Called for every connection request. Handlers may rewrite it and
    /// decide admission through `secondary`.
    pub fn on_connection_approval<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, M) -> Result<ApprovalResponse<M>> + Send + Sync + 'static,
    {
        self.connection_approval.register(handler)
    }

    /// Called for every status change notice. Handlers may rewrite it.
    pub fn on_status_change<F>(&self, handler: F) -> Result<()>
    where
        F: Fn(&P, M) -> Result<PacketResponse<M>> + Send + Sync + 'static,
    {
        self.status_change.register(handler)
    }

    // ---- entry points --------------------------------------------------

    pub fn incoming_packet(&self, peer: &P, message: M) -> Result<PacketResponse<M>> {
        self.incoming_packet.dispatch(peer, message)
    }

    pub fn ping(&self, peer: &P, message: &M) -> Result<SignalResponse> {
        self.ping.dispatch(peer, message)
    }

    pub fn query(&self, peer: &P, message: &M) -> Result<SignalResponse> {
        self.query.dispatch(peer, message)
    }

    pub fn connection_approval(&self, peer: &P, message: M) -> Result<ApprovalResponse<M>> {
        let response = self.connection_approval.dispatch(peer, message)?;
        if !response.secondary {
            self.metrics.connection_denied();
        }
        Ok(response)
    }

    pub fn status_change(&self, peer: &P, message: M) -> Result<PacketResponse<M>> {
        self.status_change.dispatch(peer, message)
    }

    /// Dispatch to the channel for `kind`.
    pub fn dispatch(&self, kind: PacketKind, peer: &P, message: M) -> Result<Outcome<M>> {
        let _timer = Timer::start(kind.name());
        let outcome = match kind {
            PacketKind::IncomingPacket => Outcome::Packet {
                kind,
                response: self.incoming_packet(peer, message)?,
            },
            PacketKind::Ping => Outcome::Signal {
                kind,
                response: self.ping(peer, &message)?,
                message,
            },
            PacketKind::Query => Outcome::Signal {
                kind,
                response: self.query(peer, &message)?,
                message,
            },
            PacketKind::ConnectionApproval => {
                Outcome::Approval(self.connection_approval(peer, message)?)
            }
            PacketKind::StatusChange => Outcome::Packet {
                kind,
                response: self.status_change(peer, message)?,
            },
        };
        Ok(outcome)
    }
}

impl<P> HookBroker<P, IncomingMessage> {
    /// Dispatch a message to the channel matching its own kind.
    pub fn dispatch_message(&self, peer: &P, message: IncomingMessage) -> Result<Outcome<IncomingMessage>> {
        self.dispatch(message.kind, peer, message)
    }
}
