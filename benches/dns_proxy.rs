//! Benchmarks for the wire-level hot paths: question parsing, length-prefixed
//! framing, and the SOCKS5 CONNECT request encoding used ahead of every DoT
//! handshake.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use horizon_dns::dns::parse_question;
use horizon_dns::wire::framing;
use horizon_dns::wire::socks5::encode_connect_request;

fn build_query(domain: &str) -> Vec<u8> {
    let mut packet = Vec::with_capacity(512);
    packet.extend_from_slice(&0x1234u16.to_be_bytes());
    packet.extend_from_slice(&[0x01, 0x00]);
    packet.extend_from_slice(&[0x00, 0x01]);
    packet.extend_from_slice(&[0x00, 0x00]);
    packet.extend_from_slice(&[0x00, 0x00]);
    packet.extend_from_slice(&[0x00, 0x00]);

    for label in domain.split('.') {
        packet.push(label.len() as u8);
        packet.extend_from_slice(label.as_bytes());
    }
    packet.push(0x00);

    packet.extend_from_slice(&[0x00, 0x01]);
    packet.extend_from_slice(&[0x00, 0x01]);
    packet
}

fn bench_parse_question(c: &mut Criterion) {
    let short = build_query("example.com");
    let long = build_query("subdomain.example.domain.internal.corp.example.com");

    let mut group = c.benchmark_group("parse_question");
    group.bench_function("short_domain", |b| {
        b.iter(|| parse_question(black_box(&short)).unwrap())
    });
    group.bench_function("long_domain", |b| {
        b.iter(|| parse_question(black_box(&long)).unwrap())
    });
    group.finish();
}

fn bench_framing_encode(c: &mut Criterion) {
    let small = build_query("example.com");
    let large = vec![0xAB; 4096];

    let mut group = c.benchmark_group("framing_write");
    group.throughput(Throughput::Bytes(small.len() as u64));
    group.bench_function("small_message", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                let mut buf = Vec::new();
                framing::write_message(&mut buf, black_box(&small)).await.unwrap();
            })
    });

    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large_message", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                let mut buf = Vec::new();
                framing::write_message(&mut buf, black_box(&large)).await.unwrap();
            })
    });
    group.finish();
}

fn bench_framing_round_trip(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let payload = build_query("example.com");

    c.bench_function("framing_round_trip", |b| {
        b.to_async(&rt).iter(|| async {
            let mut buf = Vec::new();
            framing::write_message(&mut buf, black_box(&payload)).await.unwrap();
            let mut cursor = std::io::Cursor::new(buf);
            framing::read_message(&mut cursor).await.unwrap()
        })
    });
}

fn bench_socks5_encode(c: &mut Criterion) {
    c.bench_function("encode_connect_request", |b| {
        b.iter(|| encode_connect_request(black_box("dns.google"), black_box(853)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_parse_question,
    bench_framing_encode,
    bench_framing_round_trip,
    bench_socks5_encode,
);

criterion_main!(benches);
