use criterion::{Criterion, criterion_group, criterion_main};
use lrp_ad::dual::Dual;
use std::hint::black_box;

fn bench_scalar_distributions(c: &mut Criterion) {
    let xs: Vec<f64> = (0..10_000).map(|i| (i as f64) * 0.001 - 5.0).collect();

    c.bench_function("normal_logpdf_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &x in &xs {
                acc += lrp_prob::normal::logpdf(x, 0.0, 1.3).unwrap();
            }
            black_box(acc)
        })
    });

    c.bench_function("normal_logpdf_dual_10k", |b| {
        b.iter(|| {
            let mut acc = Dual::constant(0.0);
            let sigma = Dual::var(1.3);
            for &x in &xs {
                acc = acc
                    + lrp_prob::normal::logpdf_s(Dual::constant(x), Dual::constant(0.0), sigma);
            }
            black_box(acc.dot)
        })
    });

    let precisions: Vec<f64> = (0..10_000).map(|i| ((i as f64) + 0.5) / 1_000.0).collect();
    c.bench_function("gamma_logpdf_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &x in &precisions {
                acc += lrp_prob::gamma::logpdf_shape_rate(x, 1.0, 1.0).unwrap();
            }
            black_box(acc)
        })
    });

    c.bench_function("binomial_logpmf_logit_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for (i, &x) in xs.iter().enumerate() {
                acc += lrp_prob::binomial::logpmf_logit((i % 6) as u64, 5 + (i % 2) as u64, x).unwrap();
            }
            black_box(acc)
        })
    });

    c.bench_function("bernoulli_logpmf_logit_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for (i, &x) in xs.iter().enumerate() {
                let y: u8 = if (i & 1) == 0 { 0 } else { 1 };
                acc += lrp_prob::bernoulli::logpmf_logit(y, x).unwrap();
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_scalar_distributions);
criterion_main!(benches);
