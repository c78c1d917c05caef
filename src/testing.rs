//! Shared helpers for the unit tests.

use crate::matrix::matrix::NumericMatrix;
use rand::Rng;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn matrix(lines: Vec<Vec<f64>>) -> NumericMatrix {
    NumericMatrix::from_rows(lines).unwrap()
}

/// Small integer-valued cells keep products exact.
pub fn random_matrix(rng: &mut impl Rng, rows: usize, cols: usize) -> NumericMatrix {
    NumericMatrix::new(
        rows,
        cols,
        (0..rows * cols)
            .map(|_| rng.gen_range(-9..=9) as f64)
            .collect(),
    )
    .unwrap()
}
