// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HPACK codec benchmarks: block decode and encode throughput for a
//! typical request header list, with and without Huffman coding.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use ylong_hpack::io::{Input, Output};
use ylong_hpack::{HpackDecoder, HpackEncoder, HpackHeader};

fn request_fields() -> Vec<HpackHeader> {
    vec![
        HpackHeader::new(":method", "GET"),
        HpackHeader::new(":scheme", "https"),
        HpackHeader::new(":path", "/api/v1/users"),
        HpackHeader::new(":authority", "www.example.com"),
        HpackHeader::new("user-agent", "bench/1.0"),
        HpackHeader::new("accept", "application/json"),
        HpackHeader::new("accept-encoding", "gzip, deflate"),
        HpackHeader::new("x-trace-id", "4bf92f3577b34da6a3ce929d0e0e4736"),
    ]
}

fn encode_block(fields: Vec<HpackHeader>, use_huffman: bool) -> Vec<u8> {
    let mut encoder = HpackEncoder::new(4096, use_huffman);
    let mut buf = vec![0u8; 4096];
    encoder.set_block(fields);
    let mut output = Output::last(&mut buf);
    encoder.encode(&mut output).unwrap();
    let len = output.index();
    buf.truncate(len);
    buf
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("hpack_decode");
    for (name, use_huffman) in [("raw", false), ("huffman", true)] {
        let block = encode_block(request_fields(), use_huffman);
        group.throughput(Throughput::Bytes(block.len() as u64));
        group.bench_function(name, |b| {
            b.iter_batched(
                HpackDecoder::new,
                |mut decoder| {
                    let fields = decoder
                        .decode(&mut Input::last(black_box(&block)))
                        .unwrap()
                        .unwrap();
                    black_box(fields)
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("hpack_encode");
    for (name, use_huffman) in [("raw", false), ("huffman", true)] {
        let fields = request_fields();
        group.bench_function(name, |b| {
            b.iter_batched(
                || (HpackEncoder::new(4096, use_huffman), fields.clone()),
                |(mut encoder, fields)| {
                    let mut buf = [0u8; 4096];
                    encoder.set_block(fields);
                    let mut output = Output::last(&mut buf);
                    encoder.encode(&mut output).unwrap();
                    black_box(output.index())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
