//! Benchmarks for IRC line parsing, formatting and dispatch.

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_client::encode::{format, IrcEncode};
use slirc_client::{CaseMapping, Dispatcher, IrcCodec, OutboundCommand, ParsedMessage};
use tokio_util::codec::Decoder;

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Names reply with mode prefixes
const NAMES_REPLY: &str = ":irc.server.net 353 me = #channel :~owner &admin @op %half +voice a b c d e f g";

/// Numeric response
const NUMERIC_RESPONSE: &str = ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    for (name, line) in [
        ("simple_ping", SIMPLE_MESSAGE),
        ("with_prefix", PREFIX_MESSAGE),
        ("names_reply", NAMES_REPLY),
        ("numeric_response", NUMERIC_RESPONSE),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let msg: ParsedMessage = black_box(line).parse().unwrap();
                black_box(msg)
            })
        });
    }

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Serialization");

    let privmsg = OutboundCommand::privmsg("#channel", "Hello, world!");
    let parsed: ParsedMessage = NAMES_REPLY.parse().unwrap();

    group.bench_function("privmsg_to_bytes", |b| {
        b.iter(|| black_box(black_box(&privmsg).to_bytes()))
    });

    group.bench_function("format_names_reply", |b| {
        b.iter(|| black_box(format(&parsed.command, black_box(&parsed.params))))
    });

    group.finish();
}

fn benchmark_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Framing");

    let mut stream = String::new();
    for _ in 0..64 {
        stream.push_str(PREFIX_MESSAGE);
        stream.push_str("\r\n");
    }

    group.bench_function("decode_64_lines", |b| {
        b.iter(|| {
            let mut codec = IrcCodec::default();
            let mut buf = BytesMut::from(stream.as_bytes());
            let mut count = 0;
            while let Some(line) = codec.decode(&mut buf).unwrap() {
                black_box(line);
                count += 1;
            }
            count
        })
    });

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dispatch");

    for (name, line) in [("privmsg", PREFIX_MESSAGE), ("names_reply", NAMES_REPLY)] {
        let msg: ParsedMessage = line.parse().unwrap();
        group.bench_with_input(BenchmarkId::new("feed", name), &msg, |b, msg| {
            let mut dispatcher = Dispatcher::new("me", CaseMapping::Rfc1459);
            b.iter(|| black_box(dispatcher.feed(black_box(msg))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_serialization,
    benchmark_framing,
    benchmark_dispatch,
);

criterion_main!(benches);
