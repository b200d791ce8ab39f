//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


use bytes::{Bytes, BytesMut};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use telnetd_codec::{TelnetArgument, TelnetCodec, TelnetFrame, TelnetOption, escape_data};
use tokio_util::codec::{Decoder, Encoder};

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_escape_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape_data");

    for size in [10, 100, 1000, 10000].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut buffer = BytesMut::with_capacity(size * 2);
            let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();

            b.iter(|| {
                buffer.clear();
                escape_data(black_box(&data), &mut buffer);
            });
        });
    }

    group.finish();
}

fn bench_encode_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_negotiation");

    group.bench_function("will_echo", |b| {
        let mut codec = TelnetCodec::new();
        let mut buffer = BytesMut::with_capacity(1024);

        b.iter(|| {
            buffer.clear();
            codec
                .encode(black_box(TelnetFrame::Will(TelnetOption::Echo)), &mut buffer)
                .unwrap();
        });
    });

    group.bench_function("subnegotiation", |b| {
        let mut codec = TelnetCodec::new();
        let mut buffer = BytesMut::with_capacity(1024);
        let payload = Bytes::from_static(&[0, 80, 0, 24]);

        b.iter(|| {
            buffer.clear();
            codec
                .encode(
                    black_box(TelnetFrame::Subnegotiate(TelnetOption::NAWS, payload.clone())),
                    &mut buffer,
                )
                .unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Decoding Benchmarks
// ============================================================================

fn bench_decode_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_data_sizes");

    for size in [10, 100, 1000, 10000].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut wire = BytesMut::with_capacity(size * 2);
            let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
            escape_data(&data, &mut wire);
            let wire = wire.freeze();

            b.iter(|| {
                let mut codec = TelnetCodec::new();
                let mut cursor = &wire[..];
                let mut count = 0;
                while let Some(frame) = codec.decode_buf(&mut cursor).unwrap() {
                    black_box(frame);
                    count += 1;
                }
                count
            });
        });
    }

    group.finish();
}

fn bench_decode_mixed_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_mixed_content");

    group.bench_function("login_burst", |b| {
        let mut wire = BytesMut::new();
        let mut encoder = TelnetCodec::new();
        for frame in [
            TelnetFrame::Will(TelnetOption::TTYPE),
            TelnetFrame::Will(TelnetOption::NAWS),
            TelnetFrame::Subnegotiate(TelnetOption::NAWS, Bytes::from_static(&[0, 80, 0, 24])),
            TelnetFrame::Subnegotiate(TelnetOption::TTYPE, Bytes::from_static(b"\x00XTERM")),
        ] {
            encoder.encode(frame, &mut wire).unwrap();
        }
        encoder.encode(&b"user\r\npassword\r\n"[..], &mut wire).unwrap();
        let wire = wire.freeze();

        b.iter(|| {
            let mut codec = TelnetCodec::new();
            let mut input = BytesMut::from(&wire[..]);
            while let Some(frame) = codec.decode(&mut input).unwrap() {
                if let TelnetFrame::Subnegotiate(option, payload) = frame {
                    black_box(TelnetArgument::decode(option, &payload).unwrap());
                }
            }
        });
    });

    group.finish();
}

criterion_group!(encoding_benches, bench_escape_data, bench_encode_negotiation);

criterion_group!(decoding_benches, bench_decode_data_sizes, bench_decode_mixed_content);

criterion_main!(encoding_benches, decoding_benches);
