//! Benchmarks for atlas sizing and glyph blitting.
//!
//! Glyph sets chosen to match real font resources:
//!
//! - **95**: Printable ASCII.
//! - **1024**: Latin + Cyrillic + Greek UI fonts.
//! - **8192**: A CJK subset.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use truetype_atlas_core::packer::{HeightBuckets, ShelfPacker};
use truetype_atlas_core::{Blitter, Fill, PixelFormat, Rect, SourceMode};

const GLYPH_COUNTS: [u32; 3] = [95, 1024, 8192];

/// Glyph sizes spread like a 16px proportional font: widths 0..=13,
/// heights 4..=17.
fn glyph_set(count: u32) -> HeightBuckets {
    let mut buckets = HeightBuckets::new();
    for glyph in 0..count {
        let width = (glyph * 7 + 3) % 14;
        let height = 4 + (glyph * 5 + 1) % 14;
        buckets.insert(glyph, width, height);
    }
    buckets
}

/// Full sizing pass: estimate, simulate, widen.
fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("packer/plan");
    for &count in &GLYPH_COUNTS {
        let buckets = glyph_set(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &buckets, |b, buckets| {
            b.iter(|| black_box(buckets.plan()));
        });
    }
    group.finish();
}

/// Placement replay on the planned canvas.
fn bench_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("packer/place");
    for &count in &GLYPH_COUNTS {
        let buckets = glyph_set(count);
        let size = buckets.plan();
        group.bench_with_input(BenchmarkId::from_parameter(count), &buckets, |b, buckets| {
            b.iter(|| {
                let mut packer = ShelfPacker::new(size.width, size.height);
                for item in buckets.items() {
                    black_box(packer.allocate(item.width, item.height).ok());
                }
            });
        });
    }
    group.finish();
}

/// Every writer variant on a 16x16 glyph into a 512x512 atlas.
fn bench_blit(c: &mut Criterion) {
    let mut group = c.benchmark_group("blit/16x16");
    let source: Vec<u8> = (0..256).map(|i| (i * 37 % 256) as u8).collect();
    let rect = Rect { x: 100, y: 200, w: 16, h: 16 };

    for format in [PixelFormat::La8, PixelFormat::Rgba8] {
        for mode in [SourceMode::Synthetic, SourceMode::Coverage, SourceMode::Antialiased] {
            let blitter = Blitter::new(format, mode);
            let mut atlas = vec![0u8; 512 * 512 * format.bytes_per_pixel()];
            group.bench_function(format!("{format:?}/{mode:?}"), |b| {
                b.iter(|| {
                    blitter
                        .blit(&mut atlas, 512, 512, rect, &Fill::WHITE, black_box(&source))
                        .ok();
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_plan, bench_place, bench_blit);
criterion_main!(benches);
