//! Integration tests for handing dispatch results to the server's own logic

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use packet_hooks::{
    deliver, ApprovalResponse, Delivery, HookBroker, HookError, IncomingMessage, PacketKind,
    PacketResponse, Peer, Result, ServerProtocol, SignalResponse,
};
use std::net::SocketAddr;

/// Records what the server was asked to do
#[derive(Default)]
struct RecordingServer {
    calls: Vec<(&'static str, Vec<u8>)>,
}

impl RecordingServer {
    fn record(&mut self, what: &'static str, message: IncomingMessage) -> Result<()> {
        self.calls.push((what, message.payload.to_vec()));
        Ok(())
    }
}

impl ServerProtocol<Peer, IncomingMessage> for RecordingServer {
    fn handle_data(&mut self, _peer: &Peer, message: IncomingMessage) -> Result<()> {
        self.record("data", message)
    }

    fn handle_ping(&mut self, _peer: &Peer, message: IncomingMessage) -> Result<()> {
        self.record("ping", message)
    }

    fn handle_query(&mut self, _peer: &Peer, message: IncomingMessage) -> Result<()> {
        self.record("query", message)
    }

    fn approve_connection(&mut self, _peer: &Peer, message: IncomingMessage) -> Result<()> {
        self.record("approve", message)
    }

    fn deny_connection(&mut self, _peer: &Peer, message: IncomingMessage) -> Result<()> {
        self.record("deny", message)
    }

    fn handle_status_change(&mut self, _peer: &Peer, message: IncomingMessage) -> Result<()> {
        self.record("status", message)
    }
}

fn peer() -> Peer {
    let addr: SocketAddr = "10.0.0.5:4499".parse().expect("valid address");
    Peer::new(1, addr).with_display_name("tester")
}

#[test]
fn test_untouched_traffic_reaches_server() {
    let broker: HookBroker = HookBroker::new();
    let mut server = RecordingServer::default();

    for kind in PacketKind::ALL {
        let delivery = deliver(&broker, &peer(), IncomingMessage::new(kind, "m"), &mut server)
            .expect("deliver");
        assert_eq!(delivery, Delivery::Handled);
    }

    let names: Vec<_> = server.calls.iter().map(|(n, _)| *n).collect();
    assert_eq!(names, vec!["data", "ping", "query", "approve", "status"]);
}

#[test]
fn test_server_sees_rewritten_payload() {
    let broker: HookBroker = HookBroker::new();
    broker
        .on_incoming_packet(|_, msg| Ok(PacketResponse::forward(msg.with_payload("y"))))
        .unwrap();

    let mut server = RecordingServer::default();
    let msg = IncomingMessage::new(PacketKind::IncomingPacket, "x");
    deliver(&broker, &peer(), msg, &mut server).unwrap();

    assert_eq!(server.calls, vec![("data", b"y".to_vec())]);
}

#[test]
fn test_suppressed_ping_skips_server() {
    let broker: HookBroker = HookBroker::new();
    broker
        .on_ping(|_, _| Ok(SignalResponse::proceed().stop_server()))
        .unwrap();

    let mut server = RecordingServer::default();
    let delivery = deliver(
        &broker,
        &peer(),
        IncomingMessage::new(PacketKind::Ping, ""),
        &mut server,
    )
    .unwrap();

    assert_eq!(delivery, Delivery::Suppressed);
    assert!(server.calls.is_empty());
}

#[test]
fn test_denial_is_authoritative_over_continue_server() {
    let broker: HookBroker = HookBroker::new();
    broker
        .on_connection_approval(|_, msg| Ok(ApprovalResponse::deny(msg.with_payload("banned"))))
        .unwrap();

    let mut server = RecordingServer::default();
    let delivery = deliver(
        &broker,
        &peer(),
        IncomingMessage::new(PacketKind::ConnectionApproval, "hello"),
        &mut server,
    )
    .unwrap();

    assert_eq!(delivery, Delivery::Rejected);
    assert_eq!(server.calls, vec![("deny", b"banned".to_vec())]);
}

#[test]
fn test_denial_without_server_processing_still_rejects() {
    let broker: HookBroker = HookBroker::new();
    broker
        .on_connection_approval(|_, msg| Ok(ApprovalResponse::deny(msg).stop_server().stop_plugins()))
        .unwrap();

    let mut server = RecordingServer::default();
    let delivery = deliver(
        &broker,
        &peer(),
        IncomingMessage::new(PacketKind::ConnectionApproval, "hello"),
        &mut server,
    )
    .unwrap();

    assert_eq!(delivery, Delivery::Rejected);
    assert_eq!(server.calls.len(), 1);
}

#[test]
fn test_handler_error_reaches_caller_before_server() {
    let broker: HookBroker = HookBroker::new();
    broker
        .on_status_change(|_, _| {
            Err(HookError::handler(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "malformed status",
            )))
        })
        .unwrap();

    let mut server = RecordingServer::default();
    let result = deliver(
        &broker,
        &peer(),
        IncomingMessage::new(PacketKind::StatusChange, "?"),
        &mut server,
    );

    match result {
        Err(HookError::Handler(source)) => assert!(source.to_string().contains("malformed")),
        other => panic!("Unexpected result: {other:?}"),
    }
    assert!(server.calls.is_empty());
}

#[test]
fn test_plugin_can_filter_by_peer() {
    let broker: HookBroker = HookBroker::new();
    broker
        .on_query(|peer: &Peer, _| {
            if peer.address.ip().is_loopback() {
                Ok(SignalResponse::proceed())
            } else {
                Ok(SignalResponse::proceed().stop_server().stop_plugins())
            }
        })
        .unwrap();

    let mut server = RecordingServer::default();
    let delivery = deliver(
        &broker,
        &peer(),
        IncomingMessage::new(PacketKind::Query, ""),
        &mut server,
    )
    .unwrap();
    assert_eq!(delivery, Delivery::Suppressed);
}
