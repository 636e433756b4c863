use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use packet_hooks::core::serialization::{decode, encode};
use packet_hooks::{IncomingMessage, PacketKind};

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let messages = vec![
        IncomingMessage::new(PacketKind::Ping, ""),
        IncomingMessage::new(PacketKind::IncomingPacket, "hello world"),
        IncomingMessage::new(PacketKind::StatusChange, vec![0x5A; 1024]),
    ];

    group.bench_function("encode", |b| {
        b.iter_batched(
            || messages.clone(),
            |msgs| {
                for m in msgs {
                    let _ = encode(&m).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    let blob = encode(&IncomingMessage::new(
        PacketKind::IncomingPacket,
        vec![0x5A; 1024],
    ))
    .unwrap();
    group.bench_function("decode", |b| {
        b.iter(|| {
            let _: IncomingMessage = decode(&blob).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
