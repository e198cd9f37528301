//! Benchmark: impedance matrix assembly
//!
//! Measures the singular-term precomputation and the EFIE/MFIE assembly on
//! icospheres of increasing size.
//!
//! Run with:
//!   cargo bench -p openmodes --bench impedance

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_complex::Complex64;
use openmodes::core::MfieForm;
use openmodes::mesh::icosphere;
use openmodes::operator::{
    singular_impedance_rwg, EfieOperator, IntegrationOptions, MfieOperator, Operator,
};
use openmodes::SinglePart;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;

const RADIUS: f64 = 5e-3;

fn s_at(freq: f64) -> Complex64 {
    Complex64::new(0.0, 2.0 * PI * freq)
}

/// Singular integrals of touching face pairs, bypassing the cache
fn bench_singular_terms(c: &mut Criterion) {
    let mut group = c.benchmark_group("singular_terms");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);

    for &sub in &[1, 2] {
        let num_triangles = 20 * 4usize.pow(sub as u32);
        group.throughput(Throughput::Elements(num_triangles as u64));
        group.bench_with_input(BenchmarkId::new("icosphere", sub), &sub, |b, &sub| {
            b.iter_batched(
                // a fresh mesh gets a fresh id, so nothing is cached
                || icosphere(RADIUS, sub).unwrap(),
                |mesh| black_box(singular_impedance_rwg(&mesh, 2, 1e-10, 8).unwrap()),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    let integration = IntegrationOptions::default();
    let efie = EfieOperator::new(integration.clone());
    let mfie = MfieOperator::new(integration, MfieForm::NCross);
    let s = s_at(10e9);

    for &sub in &[1, 2] {
        let part = SinglePart::new(Arc::new(icosphere(RADIUS, sub).unwrap()));
        let unknowns = part.basis().len();
        group.throughput(Throughput::Elements((unknowns * unknowns) as u64));

        group.bench_with_input(BenchmarkId::new("efie", unknowns), &part, |b, part| {
            b.iter(|| black_box(efie.impedance_single_parts(s, part, part, false).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("efie_with_derivative", unknowns), &part, |b, part| {
            b.iter(|| black_box(efie.impedance_single_parts(s, part, part, true).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("mfie", unknowns), &part, |b, part| {
            b.iter(|| black_box(mfie.impedance_single_parts(s, part, part, false).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_singular_terms, bench_assembly);
criterion_main!(benches);
