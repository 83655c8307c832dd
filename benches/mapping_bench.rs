use criterion::{criterion_group, criterion_main, Criterion};
use ledforge::allocator::{AllocationMode, OverlapAllocator, PitchCalibrationCascade};
use ledforge::api::compute_mapping;
use ledforge::calibration::CalibrationState;
use ledforge::config::MappingConfig;
use ledforge::geometry::leds::LedStrip;
use ledforge::geometry::{KeyboardGeometry, KeyboardSize};
use std::hint::black_box;

fn bench_allocation(c: &mut Criterion) {
    let geom = KeyboardGeometry::standard(KeyboardSize::Keys88);
    let strip = LedStrip::new(5.0, 2.0, 0.0, 4, 249);
    let sharing = OverlapAllocator::new(AllocationMode::Sharing, 1.5);
    let exclusive = OverlapAllocator::new(AllocationMode::Exclusive, 1.5);

    c.bench_function("allocate_88_sharing", |b| {
        b.iter(|| black_box(sharing.allocate(black_box(&geom), black_box(&strip))))
    });
    c.bench_function("allocate_88_exclusive", |b| {
        b.iter(|| black_box(exclusive.allocate(black_box(&geom), black_box(&strip))))
    });

    let cascade = PitchCalibrationCascade::new(sharing);
    c.bench_function("cascade_88", |b| {
        b.iter(|| black_box(cascade.run(black_box(&geom), black_box(&strip))))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let config = MappingConfig::default();
    let calibration = CalibrationState::default()
        .with_global_offset(1)
        .with_key_offset(60, 1)
        .with_trim(72, 1, 0)
        .with_weld(120, 5.2);

    c.bench_function("full_pipeline_88", |b| {
        b.iter(|| black_box(compute_mapping(black_box(&config), black_box(&calibration))))
    });

    let run = compute_mapping(&config, &calibration).expect("pipeline");
    c.bench_function("diagnostics_88", |b| b.iter(|| black_box(run.diagnostics())));
}

criterion_group!(benches, bench_allocation, bench_pipeline);
criterion_main!(benches);
