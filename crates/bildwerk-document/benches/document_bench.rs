// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the bildwerk-document crate: the fit arithmetic on
// its own, and a full page assembly run over a few synthetic images.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use bildwerk_core::{ImageItem, PaperFormat};
use bildwerk_document::{ConversionOptions, FittedPage, PageAssembler};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_fit(c: &mut Criterion) {
    c.bench_function("fit_page (A4, 4032x3024)", |b| {
        b.iter(|| FittedPage::compute(black_box(4032), black_box(3024), PaperFormat::A4));
    });
}

/// Assemble three 2000x1500 PNGs into an A4 document. The images are larger
/// than the 150 DPI canvas, so each one is resampled before encoding.
fn bench_assembly(c: &mut Criterion) {
    let img = RgbImage::from_fn(2000, 1500, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 64]));
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    let items: Vec<ImageItem> = (0..3)
        .map(|i| ImageItem::new(format!("{i}.png"), "image/png", png.clone()))
        .collect();

    let mut group = c.benchmark_group("assembly");
    group.sample_size(10);
    group.bench_function("three pages (A4)", |b| {
        b.iter(|| {
            let report = PageAssembler::new(ConversionOptions::default())
                .run_items(black_box(&items), chrono::Utc::now())
                .unwrap();
            black_box(report.pdf.len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_fit, bench_assembly);
criterion_main!(benches);
