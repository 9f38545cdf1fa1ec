use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use webpdec::{DecodedImage, Dimensions, Pipeline, pack};

const FRAMES: [(u32, u32); 3] = [(64, 32), (128, 64), (256, 256)];

fn noise(width: u32, height: u32) -> Vec<u8> {
    let mut rng = SmallRng::seed_from_u64(0xbe7c);
    let mut rgb = vec![0u8; (width * height * 3) as usize];
    rng.fill(&mut rgb[..]);
    rgb
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = Pipeline::new();
    for (w, h) in FRAMES {
        let rgb = noise(w, h);
        let lossless = webp::Encoder::from_rgb(&rgb, w, h).encode_lossless().to_vec();
        let lossy = webp::Encoder::from_rgb(&rgb, w, h).encode(80.0).to_vec();
        group.throughput(Throughput::Elements(u64::from(w * h)));

        group.bench_with_input(
            BenchmarkId::new("lossless", format!("{w}x{h}")),
            &lossless,
            |b, data| b.iter(|| pipeline.process(black_box(data), w, h)),
        );
        group.bench_with_input(
            BenchmarkId::new("lossy", format!("{w}x{h}")),
            &lossy,
            |b, data| b.iter(|| pipeline.process(black_box(data), w, h)),
        );
    }
    group.finish();
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");
    for (w, h) in FRAMES {
        let img = DecodedImage::from_rgb(w, h, noise(w, h)).expect("valid buffer");
        let dims = Dimensions::new(w, h);
        group.throughput(Throughput::Elements(u64::from(w * h)));
        group.bench_with_input(BenchmarkId::from_parameter(dims), &img, |b, img| {
            b.iter(|| pack(black_box(img), dims))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_pack);
criterion_main!(benches);
