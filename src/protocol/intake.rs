//! Hand-off from the hook pipeline to the server's own protocol handling.
//!
//! [`deliver`] runs a classified message through the broker and then applies
//! the response contract: the server's handler only runs when the final
//! response lets it, and sees the payload as rewritten by the plugins. A
//! denied connection approval is always turned into a rejection, even when
//! `continue_server` is still set.

use crate::core::packet::{IncomingMessage, PacketKind};
use crate::error::Result;
use crate::protocol::broker::HookBroker;
use tracing::debug;

/// The server's built-in handling, run after the plugin chain.
pub trait ServerProtocol<P, M> {
    fn handle_data(&mut self, peer: &P, message: M) -> Result<()>;
    fn handle_ping(&mut self, peer: &P, message: M) -> Result<()>;
    fn handle_query(&mut self, peer: &P, message: M) -> Result<()>;
    fn approve_connection(&mut self, peer: &P, message: M) -> Result<()>;
    fn deny_connection(&mut self, peer: &P, message: M) -> Result<()>;
    fn handle_status_change(&mut self, peer: &P, message: M) -> Result<()>;
}

/// What happened to a delivered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The server's built-in handler ran
    Handled,
    /// A plugin asked the server to skip this message
    Suppressed,
    /// The connection request was rejected
    Rejected,
}

/// Dispatch `message` through the broker and hand the result to `server`.
///
/// Handler errors are returned before the server sees anything.
pub fn deliver<P, S>(
    broker: &HookBroker<P, IncomingMessage>,
    peer: &P,
    message: IncomingMessage,
    server: &mut S,
) -> Result<Delivery>
where
    S: ServerProtocol<P, IncomingMessage>,
{
    let outcome = broker.dispatch_message(peer, message)?;
    let kind = outcome.kind();

    if outcome.is_rejected() {
        debug!(kind = kind.name(), "Connection rejected by plugin");
        server.deny_connection(peer, outcome.into_message())?;
        return Ok(Delivery::Rejected);
    }

    if !outcome.continue_server() {
        debug!(kind = kind.name(), "Server processing suppressed by plugin");
        return Ok(Delivery::Suppressed);
    }

    let message = outcome.into_message();
    match kind {
        PacketKind::IncomingPacket => server.handle_data(peer, message)?,
        PacketKind::Ping => server.handle_ping(peer, message)?,
        PacketKind::Query => server.handle_query(peer, message)?,
        PacketKind::ConnectionApproval => server.approve_connection(peer, message)?,
        PacketKind::StatusChange => server.handle_status_change(peer, message)?,
    }
    Ok(Delivery::Handled)
}
