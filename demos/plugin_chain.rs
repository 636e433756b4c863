//! Example: a small plugin chain in front of a server
//!
//! Registers three plugins (a chat filter, a ban list and a quiet ping
//! monitor) and pushes a few packets through them.
//!
//! Run with: `cargo run --example plugin_chain`

#![allow(clippy::uninlined_format_args)]

use packet_hooks::config::PipelineConfig;
use packet_hooks::utils::logging::init_logging;
use packet_hooks::{
    deliver, ApprovalResponse, HookBroker, IncomingMessage, PacketKind, PacketResponse, Peer,
    Result, ServerProtocol, SignalResponse,
};
use std::net::SocketAddr;

struct PrintingServer;

impl ServerProtocol<Peer, IncomingMessage> for PrintingServer {
    fn handle_data(&mut self, peer: &Peer, message: IncomingMessage) -> Result<()> {
        println!("   server: data from {} -> {:?}", peer, message.payload);
        Ok(())
    }

    fn handle_ping(&mut self, peer: &Peer, _message: IncomingMessage) -> Result<()> {
        println!("   server: pong to {}", peer);
        Ok(())
    }

    fn handle_query(&mut self, peer: &Peer, _message: IncomingMessage) -> Result<()> {
        println!("   server: discovery reply to {}", peer);
        Ok(())
    }

    fn approve_connection(&mut self, peer: &Peer, _message: IncomingMessage) -> Result<()> {
        println!("   server: {} joined", peer);
        Ok(())
    }

    fn deny_connection(&mut self, peer: &Peer, message: IncomingMessage) -> Result<()> {
        println!("   server: {} rejected ({:?})", peer, message.payload);
        Ok(())
    }

    fn handle_status_change(&mut self, peer: &Peer, message: IncomingMessage) -> Result<()> {
        println!("   server: {} status {:?}", peer, message.payload);
        Ok(())
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::from_env()?;
    init_logging(&config.logging)?;

    let broker: HookBroker = HookBroker::with_config(&config.hooks);

    // Chat filter: rewrites, lets everyone else see the cleaned packet
    broker.on_incoming_packet(|_, msg| {
        let text = String::from_utf8_lossy(&msg.payload).replace("darn", "****");
        Ok(PacketResponse::forward(msg.with_payload(text)))
    })?;

    // Ban list: denies by address, stops other plugins from overriding
    let banned: SocketAddr = "203.0.113.9:4499".parse()?;
    broker.on_connection_approval(move |peer: &Peer, msg| {
        if peer.address == banned {
            Ok(ApprovalResponse::deny(msg.with_payload("banned")).stop_plugins())
        } else {
            Ok(ApprovalResponse::admit(msg))
        }
    })?;

    // Ping monitor: observes, answers nothing itself
    broker.on_ping(|peer: &Peer, _| {
        println!("   monitor: ping from {}", peer);
        Ok(SignalResponse::proceed())
    })?;

    let mut server = PrintingServer;
    let alice = Peer::new(1, "198.51.100.2:4499".parse()?).with_display_name("alice");
    let mallory = Peer::new(2, banned).with_display_name("mallory");

    let traffic = [
        (&alice, IncomingMessage::new(PacketKind::ConnectionApproval, "join")),
        (&mallory, IncomingMessage::new(PacketKind::ConnectionApproval, "join")),
        (&alice, IncomingMessage::new(PacketKind::IncomingPacket, "well darn it")),
        (&alice, IncomingMessage::new(PacketKind::Ping, "")),
        (&alice, IncomingMessage::new(PacketKind::StatusChange, "disconnected")),
    ];

    for (peer, message) in traffic {
        println!("{} from {}", message.kind, peer);
        let delivery = deliver(&broker, peer, message, &mut server)?;
        println!("   -> {:?}\n", delivery);
    }

    broker.metrics().log_metrics();
    Ok(())
}
