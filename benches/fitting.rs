use criterion::{criterion_group, criterion_main, Criterion};
use salesfit::{
    correlate, fit, statistics::summarize, test::synthetic_dataset, CoefficientSet, Dataset,
    FitOptions, RegressionFitter,
};
use std::hint::black_box;

const TRUE_MODEL: CoefficientSet = CoefficientSet {
    intercept: 2.921,
    tv: 0.047,
    radio: 0.188,
    newspaper: 0.002,
};

fn gen_sample_data(n: usize) -> Dataset {
    synthetic_dataset(&TRUE_MODEL, n, 1.0, 42).expect("Failed to generate data")
}

struct CriterionTestEntry<V> {
    id: String,
    values: V,
}
impl<V> CriterionTestEntry<V> {
    pub fn new(id: &str, values: V) -> Self {
        Self {
            id: id.to_string(),
            values,
        }
    }
}

fn scaling_entries() -> Vec<CriterionTestEntry<Dataset>> {
    vec![
        CriterionTestEntry::new("n=200", gen_sample_data(200)),
        CriterionTestEntry::new("n=1_000", gen_sample_data(1_000)),
        CriterionTestEntry::new("n=10_000", gen_sample_data(10_000)),
        CriterionTestEntry::new("n=100_000", gen_sample_data(100_000)),
        #[cfg(feature = "parallel")]
        CriterionTestEntry::new("n=1_000_000", gen_sample_data(1_000_000)),
    ]
}

fn test_criterion_group<F, V>(c: &mut Criterion, id: &str, samples: &[CriterionTestEntry<V>], runner: F)
where
    for<'a, 'b, 'c> F: Fn(&'a mut criterion::Bencher<'b>, &'c V),
{
    let mut group = c.benchmark_group(id);
    for sample in samples {
        group.bench_with_input(&sample.id, &sample.values, &runner);
    }
    group.finish();
}

fn criterion_benchmark(c: &mut Criterion) {
    let entries = scaling_entries();

    //
    // How the solver scales with data size
    println!("Benchmarking fit vs n...");
    test_criterion_group(c, "fit_vs_n", &entries, |b, data| {
        b.iter(|| fit(black_box(data)));
    });

    println!("Benchmarking correlate vs n...");
    test_criterion_group(c, "correlate_vs_n", &entries, |b, data| {
        b.iter(|| correlate(black_box(data)));
    });

    println!("Benchmarking summarize vs n...");
    test_criterion_group(c, "summarize_vs_n", &entries, |b, data| {
        b.iter(|| summarize(black_box(data)));
    });

    //
    // SVD against the chunked normal equations, on the same data
    #[cfg(feature = "parallel")]
    {
        println!("Benchmarking fit vs solver (n=1_000_000)...");
        let samples = gen_sample_data(1_000_000);
        let svd = RegressionFitter::new(FitOptions {
            parallel_threshold: usize::MAX,
            ..FitOptions::default()
        });
        let normal = RegressionFitter::new(FitOptions {
            parallel_threshold: 0,
            ..FitOptions::default()
        });

        let mut group = c.benchmark_group("fit_vs_solver");
        group.bench_function("SVD", |b| b.iter(|| svd.fit(black_box(&samples))));
        group.bench_function("Parallel normal equations", |b| {
            b.iter(|| normal.fit(black_box(&samples)))
        });
        group.finish();
    }

    //
    // Fitter construction is free; options only matter at fit time
    let samples = gen_sample_data(1_000);
    let strict = RegressionFitter::new(FitOptions {
        rank_tolerance: 1e-6,
        ..FitOptions::default()
    });
    let mut group = c.benchmark_group("fit_vs_tolerance");
    group.bench_function("default", |b| {
        b.iter(|| RegressionFitter::default().fit(black_box(&samples)))
    });
    group.bench_function("1e-6", |b| b.iter(|| strict.fit(black_box(&samples))));
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
