//! Criterion benchmarks for the MouseShare JSON codec.
//!
//! Pointer traffic arrives at display refresh rate, so decoding a `mouse`
//! message must stay far below a frame budget.
//!
//! Run with:
//! ```bash
//! cargo bench --package mouseshare-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mouseshare_core::{decode_message, encode_message, FrameDecoder, OutboundMessage};

// ── Message fixtures ──────────────────────────────────────────────────────────

const MOUSE: &[u8] = br#"{"type":"mouse","x":512,"y":1024}"#;
const CLICK: &[u8] = br#"{"type":"click","x":512,"y":1024,"action":"down","button":"left"}"#;
const SCROLL: &[u8] = br#"{"type":"scroll","dx":0,"dy":-3}"#;
const PAIRING_RESPONSE: &[u8] = br#"{"type":"pairing_response","status":"success"}"#;

fn mouse_burst(count: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(count * (MOUSE.len() + 1));
    for _ in 0..count {
        buf.extend_from_slice(MOUSE);
        buf.push(b'\n');
    }
    buf
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_decode_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_single");
    for (name, bytes) in [
        ("mouse", MOUSE),
        ("click", CLICK),
        ("scroll", SCROLL),
        ("pairing_response", PAIRING_RESPONSE),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), bytes, |b, bytes| {
            b.iter(|| decode_message(black_box(bytes)))
        });
    }
    group.finish();
}

fn bench_frame_decoder_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decoder_burst");
    for count in [1usize, 16, 128] {
        let burst = mouse_burst(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &burst, |b, burst| {
            b.iter(|| {
                let mut decoder = FrameDecoder::new();
                decoder.push(black_box(burst))
            })
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let pairing = OutboundMessage::Pairing {
        code: "123456".to_string(),
    };
    let screen = OutboundMessage::ScreenInfo {
        width: 1080,
        height: 2400,
    };
    c.bench_function("encode_pairing", |b| b.iter(|| encode_message(black_box(&pairing))));
    c.bench_function("encode_screen_info", |b| b.iter(|| encode_message(black_box(&screen))));
}

criterion_group!(benches, bench_decode_single, bench_frame_decoder_burst, bench_encode);
criterion_main!(benches);
