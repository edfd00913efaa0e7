// Display pipeline benchmarks
// Performance benchmarks for decoding, expansion and full frame rendering

use criterion::{criterion_group, criterion_main, Criterion};
use pro_term::display::{
    BitPlanes, ColorExpander, FrameDiffer, IndexBuffer, Screen, VramDecoder, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
use pro_term::overlay::{Column, DrawMode, Font, Row};
use pro_term::{HeadlessSurface, Overlay};
use std::hint::black_box;

/// Video memory with a different index in every 16-pixel word
fn test_pattern() -> BitPlanes {
    let mut planes = BitPlanes::new();
    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            planes.set_pixel(x, y, ((x / 16 + y) % 8) as u8);
        }
    }
    planes
}

/// Benchmark the bit-plane decoder over a full screen
fn bench_decode(c: &mut Criterion) {
    let planes = test_pattern();
    let decoder = VramDecoder::new();
    let mut indices = IndexBuffer::new(SCREEN_HEIGHT);

    c.bench_function("decode_full_screen", |b| {
        b.iter(|| {
            decoder.decode(black_box(&planes), &mut indices);
            black_box(indices.as_slice());
        });
    });
}

/// Benchmark RGB332 to RGB24 expansion and the frame comparison
fn bench_expand(c: &mut Criterion) {
    let planes = test_pattern();
    let mut indices = IndexBuffer::new(SCREEN_HEIGHT);
    VramDecoder::new().decode(&planes, &mut indices);

    let mut group = c.benchmark_group("expand");

    group.bench_function("rgb24", |b| {
        let mut expander = ColorExpander::new();
        b.iter(|| {
            let rgb = expander.expand(black_box(indices.as_slice())).unwrap();
            black_box(rgb.len());
        });
    });

    group.bench_function("diff_unchanged", |b| {
        let mut differ = FrameDiffer::new();
        differ.compare(indices.as_slice());
        b.iter(|| black_box(differ.compare(black_box(indices.as_slice()))));
    });

    group.finish();
}

/// Benchmark whole frames through the screen pipeline
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(50);

    // A frame that changes every time is decoded, expanded and uploaded
    group.bench_function("changing_frame", |b| {
        let mut planes = test_pattern();
        let mut screen = Screen::new();
        let mut overlay = Overlay::default();
        let mut surface = HeadlessSurface::new();
        screen.open(SCREEN_HEIGHT);
        let mut index = 0u8;

        b.iter(|| {
            index = (index + 1) % 8;
            planes.set_pixel(0, 0, index);
            black_box(screen.render(&planes, &mut overlay, &mut surface).unwrap());
        });
    });

    // A static frame only costs the decode and the comparison
    group.bench_function("static_frame", |b| {
        let planes = test_pattern();
        let mut screen = Screen::new();
        let mut overlay = Overlay::default();
        let mut surface = HeadlessSurface::new();
        screen.open(SCREEN_HEIGHT);

        b.iter(|| black_box(screen.render(&planes, &mut overlay, &mut surface).unwrap()));
    });

    // Overlay text over a static frame forces a composite every frame
    group.bench_function("overlay_composite", |b| {
        let planes = test_pattern();
        let mut screen = Screen::new();
        let mut overlay = Overlay::default();
        let mut surface = HeadlessSurface::new();
        screen.open(SCREEN_HEIGHT);
        overlay.open();
        overlay.enable();

        b.iter(|| {
            overlay.print_text(
                Column::Absolute(0),
                Row::Absolute(0),
                DrawMode::Replace,
                Font::Normal,
                "PRO 350 BENCHMARK",
            );
            black_box(screen.render(&planes, &mut overlay, &mut surface).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_expand, bench_render);
criterion_main!(benches);
