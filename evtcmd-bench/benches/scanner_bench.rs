//! Frame scanner benchmarks.

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use evtcmd_protocol::{BufferSource, NoPacing, Scanner};
use std::time::Duration;

fn stream(frames: usize, data_len: usize) -> BytesMut {
    let data = "7".repeat(data_len);
    let mut buf = BytesMut::new();
    for _ in 0..frames {
        buf.extend_from_slice(b"~~>set:");
        buf.extend_from_slice(data.as_bytes());
        buf.extend_from_slice(b"!");
    }
    buf
}

fn scanner(input: &[u8]) -> Scanner<BufferSource, NoPacing> {
    Scanner::new(BufferSource::from(input))
        .with_pacer(NoPacing)
        .with_read_delay(Duration::ZERO)
        .with_max_field_len(0)
}

fn bench_scan_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_frames");

    for data_len in [0, 16, 200] {
        let input = stream(100, data_len);

        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(data_len), &input, |b, input| {
            b.iter(|| {
                let mut scanner = scanner(input);
                let mut frames = 0;
                while scanner.scan().unwrap() {
                    frames += 1;
                }
                black_box(frames)
            });
        });
    }

    group.finish();
}

fn bench_scan_byte_at_a_time(c: &mut Criterion) {
    let input = stream(10, 16);

    c.bench_function("scan_byte_at_a_time", |b| {
        b.iter(|| {
            let mut scanner = scanner(b"");
            let mut frames = 0;
            for &byte in input.iter() {
                scanner.source_mut().push(&[byte]);
                if scanner.scan().unwrap() {
                    frames += 1;
                }
            }
            black_box(frames)
        });
    });
}

fn bench_scan_noise(c: &mut Criterion) {
    let noise = vec![b'x'; 4096];

    let mut group = c.benchmark_group("scan_noise");
    group.throughput(Throughput::Bytes(noise.len() as u64));
    group.bench_function("4k", |b| {
        b.iter(|| {
            let mut scanner = scanner(&noise);
            black_box(scanner.scan().unwrap())
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_scan_frames,
    bench_scan_byte_at_a_time,
    bench_scan_noise,
);
criterion_main!(benches);
