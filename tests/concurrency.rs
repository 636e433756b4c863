use packet_hooks::{HookBroker, IncomingMessage, PacketKind, PacketResponse, Peer, SignalResponse};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn peer(id: u64) -> Peer {
    Peer::new(
        id,
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000 + (id % 1000) as u16),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_dispatch_many_peers() {
    use tokio::task::JoinSet;

    let iterations = 5_000usize;
    let broker: Arc<HookBroker> = Arc::new(HookBroker::new());
    let seen = Arc::new(AtomicU64::new(0));

    let counter = seen.clone();
    broker
        .on_incoming_packet(move |peer: &Peer, msg: IncomingMessage| {
            counter.fetch_add(1, Ordering::Relaxed);
            let tagged = format!("{}:{}", peer.id, String::from_utf8_lossy(&msg.payload));
            Ok(PacketResponse::forward(msg.with_payload(tagged)))
        })
        .unwrap();
    broker
        .on_ping(|_, _| Ok(SignalResponse::proceed().stop_server()))
        .unwrap();

    let mut tasks = JoinSet::new();
    for id in 0..8u64 {
        let broker = broker.clone();
        tasks.spawn(async move {
            let peer = peer(id);
            for i in 0..iterations {
                let msg = IncomingMessage::new(PacketKind::IncomingPacket, format!("{i}"));
                let response = broker.incoming_packet(&peer, msg).unwrap();
                assert_eq!(
                    String::from_utf8_lossy(&response.payload.payload),
                    format!("{id}:{i}")
                );

                let ping = IncomingMessage::new(PacketKind::Ping, "");
                assert!(!broker.ping(&peer, &ping).unwrap().continue_server);
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    assert_eq!(seen.load(Ordering::Relaxed), 8 * iterations as u64);
    let snapshot = broker.metrics().snapshot();
    assert_eq!(snapshot.incoming_packets, 8 * iterations as u64);
    assert_eq!(snapshot.pings, 8 * iterations as u64);
    assert_eq!(snapshot.server_vetoes, 8 * iterations as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn registration_while_dispatching_never_tears() {
    use tokio::task::JoinSet;

    let broker: Arc<HookBroker<u64, Vec<u8>>> = Arc::new(HookBroker::new());
    let mut tasks = JoinSet::new();

    // Every handler appends one byte, so the payload length equals the
    // number of handlers in the snapshot that dispatch used.
    let writer = broker.clone();
    tasks.spawn(async move {
        for _ in 0..200 {
            writer
                .on_status_change(|_, mut msg: Vec<u8>| {
                    msg.push(1);
                    Ok(PacketResponse::forward(msg))
                })
                .unwrap();
            tokio::task::yield_now().await;
        }
    });

    for id in 0..3u64 {
        let reader = broker.clone();
        tasks.spawn(async move {
            let mut last = 0usize;
            for _ in 0..2_000 {
                let response = reader.status_change(&id, Vec::new()).unwrap();
                let len = response.payload.len();
                assert!(len >= last, "handler list shrank: {len} < {last}");
                assert!(response.payload.iter().all(|b| *b == 1));
                last = len;
                tokio::task::yield_now().await;
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
    assert_eq!(broker.handler_count(PacketKind::StatusChange), 200);
}
