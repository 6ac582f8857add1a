use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cellframe_omics::{build_frame, AnnData, FrameOptions, MatrixData, SparseMatrix};

fn random_counts(rows: usize, cols: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut state = seed;
    (0..rows)
        .map(|_| {
            (0..cols)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    let u = (state >> 11) as f64 / (1u64 << 53) as f64;
                    // ~90% zeros, like a count matrix
                    if u < 0.9 { 0.0 } else { (u * 100.0).floor() }
                })
                .collect()
        })
        .collect()
}

fn dataset(x: MatrixData, n_obs: usize, n_vars: usize) -> AnnData {
    let mut adata = AnnData::new(
        x,
        (0..n_obs).map(|i| format!("cell_{i}")).collect(),
        (0..n_vars).map(|j| format!("gene_{j}")).collect(),
    )
    .unwrap();
    let labels: Vec<String> = (0..n_obs).map(|i| (i % 12).to_string()).collect();
    adata.add_obs_categorical("leiden", &labels).unwrap();
    adata
}

fn bench_build_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_frame");

    let counts = random_counts(5_000, 500, 42);
    let dense = dataset(MatrixData::Dense(counts.clone()), 5_000, 500);
    let csr = SparseMatrix::from_dense(&counts, 0.0);
    let csc = csr.to_csc();
    let sparse_csr = dataset(MatrixData::Sparse(csr), 5_000, 500);
    let sparse_csc = dataset(MatrixData::Sparse(csc), 5_000, 500);
    let keys: Vec<String> = (0..20).map(|j| format!("gene_{}", j * 25)).collect();
    let opts = FrameOptions::default();

    group.bench_function("dense_5k_x20", |b| {
        b.iter(|| build_frame(black_box(&dense), &keys, &opts))
    });
    group.bench_function("csr_5k_x20", |b| {
        b.iter(|| build_frame(black_box(&sparse_csr), &keys, &opts))
    });
    group.bench_function("csc_5k_x20", |b| {
        b.iter(|| build_frame(black_box(&sparse_csc), &keys, &opts))
    });

    group.finish();
}

criterion_group!(benches, bench_build_frame);
criterion_main!(benches);
