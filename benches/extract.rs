use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrupi::detector::{adaptive_binarize, otsu_binarize, FinderDetector};
use qrupi::{locate_and_decode, ExtractorConfig, PixelGrid};

/// Flat gray field with three drawn finder patterns, the worst case for
/// the scanner short of a full symbol.
fn synthetic_scene(width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![230u8; width * height];
    let unit = 8usize;
    for &(ox, oy) in &[(40, 40), (width - 96, 40), (40, height - 96)] {
        for my in 0..7 {
            for mx in 0..7 {
                let ring = mx == 0 || mx == 6 || my == 0 || my == 6;
                let core = (2..=4).contains(&mx) && (2..=4).contains(&my);
                if !(ring || core) {
                    continue;
                }
                for dy in 0..unit {
                    for dx in 0..unit {
                        gray[(oy + my * unit + dy) * width + ox + mx * unit + dx] = 10;
                    }
                }
            }
        }
    }
    gray
}

fn bench_adaptive_binarize(c: &mut Criterion) {
    let gray = synthetic_scene(640, 480);
    c.bench_function("adaptive_binarize_640x480", |b| {
        b.iter(|| adaptive_binarize(black_box(&gray), black_box(640), black_box(480)))
    });
}

fn bench_otsu_binarize(c: &mut Criterion) {
    let gray = synthetic_scene(640, 480);
    c.bench_function("otsu_binarize_640x480", |b| {
        b.iter(|| otsu_binarize(black_box(&gray), black_box(640), black_box(480)))
    });
}

fn bench_finder_scan(c: &mut Criterion) {
    let gray = synthetic_scene(640, 480);
    let binary = otsu_binarize(&gray, 640, 480);
    c.bench_function("finder_scan_640x480", |b| {
        b.iter(|| FinderDetector::detect(black_box(&binary)))
    });
}

fn bench_finder_scan_large(c: &mut Criterion) {
    let gray = synthetic_scene(1920, 1080);
    let binary = otsu_binarize(&gray, 1920, 1080);
    c.bench_function("finder_scan_1920x1080", |b| {
        b.iter(|| FinderDetector::detect(black_box(&binary)))
    });
}

fn bench_locate_and_decode(c: &mut Criterion) {
    let gray = synthetic_scene(640, 480);
    let grid = PixelGrid::new(640, 480, gray).unwrap();
    let config = ExtractorConfig::default();
    c.bench_function("locate_and_decode_640x480", |b| {
        b.iter(|| locate_and_decode(black_box(&grid), black_box(&config)))
    });
}

criterion_group!(
    benches,
    bench_adaptive_binarize,
    bench_otsu_binarize,
    bench_finder_scan,
    bench_finder_scan_large,
    bench_locate_and_decode
);
criterion_main!(benches);
