use num_traits::NumCast;
use std::cmp::Ordering;

use crate::config::{EngineConfig, PivotStrategy};
use crate::engine::determinant::DeterminantEngine;
use crate::matrix::matrix::{Element, NumericMatrix};
use crate::result::MatrixError;

/// Matrices with `|det|` below this are treated as non-invertible.
pub const SINGULAR_EPSILON: f64 = 1e-10;

/// Gauss–Jordan inversion on an augmented `[A | I]` buffer.
#[derive(Debug, Clone, Default)]
pub struct EliminationEngine {
    config: EngineConfig,
    determinant: DeterminantEngine,
}

impl EliminationEngine {
    pub fn new(config: EngineConfig) -> Self {
        EliminationEngine {
            determinant: DeterminantEngine::new(config.clone().with_trace(false)),
            config,
        }
    }

    pub fn inverse<T: Element>(
        &self,
        a: &NumericMatrix<T>,
    ) -> Result<NumericMatrix<T>, MatrixError> {
        if !a.is_square() {
            return Err(MatrixError::NotSquare {
                operation: "inverse",
                shape: a.shape(),
            });
        }

        let det = self.determinant.value(a)?;
        let threshold = <T as NumCast>::from(SINGULAR_EPSILON).unwrap_or_else(T::epsilon);
        if det.abs() < threshold {
            log::warn!("{} matrix is singular (det = {})", a.shape(), det);
            return Err(MatrixError::Singular {
                magnitude: magnitude(det),
            });
        }

        let mut state = EliminationState::new(a);
        state.forward(self.config.pivoting)?;
        state.backward()?;
        state.normalize()?;
        state.into_inverse()
    }
}

fn magnitude<T: Element>(x: T) -> f64 {
    x.abs().to_f64().unwrap_or(f64::NAN)
}

/// `n x 2n` working buffer, row-major. Left half starts as `A`, right half as
/// `I_n`; once the left half is reduced to `I_n` the right half is `A⁻¹`.
struct EliminationState<T> {
    n: usize,
    cells: Vec<T>,
}

impl<T: Element> EliminationState<T> {
    fn new(a: &NumericMatrix<T>) -> Self {
        let n = a.rows();
        let cells = (0..n)
            .flat_map(|r| {
                a.row(r)
                    .iter()
                    .copied()
                    .chain((0..n).map(move |c| if r == c { T::one() } else { T::zero() }))
            })
            .collect();

        EliminationState { n, cells }
    }

    #[inline(always)]
    fn width(&self) -> usize {
        2 * self.n
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> T {
        self.cells[row * self.width() + col]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        let w = self.width();
        for k in 0..w {
            self.cells.swap(a * w + k, b * w + k);
        }
    }

    /// `row[target] -= factor * row[source]`
    fn subtract_row(&mut self, target: usize, source: usize, factor: T) {
        let w = self.width();
        for k in 0..w {
            self.cells[target * w + k] =
                self.cells[target * w + k] - factor * self.cells[source * w + k];
        }
    }

    fn select_pivot(&self, col: usize, strategy: PivotStrategy) -> usize {
        match strategy {
            PivotStrategy::Partial => (col..self.n)
                .max_by(|&x, &y| {
                    self.at(x, col)
                        .abs()
                        .partial_cmp(&self.at(y, col).abs())
                        .unwrap_or(Ordering::Equal)
                })
                .unwrap_or(col),
            PivotStrategy::FirstNonZero => (col..self.n)
                .find(|&r| self.at(r, col) != T::zero())
                .unwrap_or(col),
        }
    }

    /// Diagonal entry of `col`, rejected when it is too small to divide by.
    fn pivot(&self, col: usize) -> Result<T, MatrixError> {
        let pivot = self.at(col, col);
        if !(pivot.abs() >= T::epsilon()) {
            log::warn!("pivot {} in column {} vanished", pivot, col);
            return Err(MatrixError::NumericInstability {
                column: col,
                pivot: magnitude(pivot),
            });
        }
        Ok(pivot)
    }

    fn forward(&mut self, strategy: PivotStrategy) -> Result<(), MatrixError> {
        for i in 0..self.n {
            let k = self.select_pivot(i, strategy);
            if k != i {
                log::trace!("column {}: swapping rows {} and {}", i, i, k);
                self.swap_rows(i, k);
            }

            let pivot = self.pivot(i)?;
            for k in i + 1..self.n {
                let factor = self.at(k, i) / pivot;
                if factor != T::zero() {
                    self.subtract_row(k, i, factor);
                }
            }
        }
        Ok(())
    }

    fn backward(&mut self) -> Result<(), MatrixError> {
        for i in (0..self.n).rev() {
            let pivot = self.pivot(i)?;
            for k in 0..i {
                let factor = self.at(k, i) / pivot;
                if factor != T::zero() {
                    self.subtract_row(k, i, factor);
                }
            }
        }
        Ok(())
    }

    fn normalize(&mut self) -> Result<(), MatrixError> {
        let w = self.width();
        for i in 0..self.n {
            let pivot = self.pivot(i)?;
            for k in 0..w {
                self.cells[i * w + k] = self.cells[i * w + k] / pivot;
            }
        }
        Ok(())
    }

    fn into_inverse(self) -> Result<NumericMatrix<T>, MatrixError> {
        let n = self.n;
        let data: Vec<T> = self
            .cells
            .chunks(self.width())
            .flat_map(|row| row[n..].iter().copied())
            .collect();

        if let Some(idx) = data.iter().position(|x| !x.is_finite()) {
            return Err(MatrixError::NumericInstability {
                column: idx % n,
                pivot: magnitude(data[idx]),
            });
        }

        Ok(NumericMatrix::from_raw(n, n, data))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::matrix_ops::multiply;
    use crate::result::ErrorKind;
    use crate::testing::{init_logger, matrix, random_matrix};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_inverse_2x2() {
        let engine = EliminationEngine::default();
        let inv = engine
            .inverse(&matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]))
            .unwrap();
        assert_abs_diff_eq!(
            inv,
            matrix(vec![vec![-2.0, 1.0], vec![1.5, -0.5]]),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_inverse_1x1_and_3x3() {
        let engine = EliminationEngine::default();
        assert_eq!(
            engine.inverse(&matrix(vec![vec![4.0]])).unwrap().to_rows(),
            vec![vec![0.25]]
        );

        let a = matrix(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 10.0],
        ]);
        let expected = matrix(vec![
            vec![-2.0 / 3.0, -4.0 / 3.0, 1.0],
            vec![-2.0 / 3.0, 11.0 / 3.0, -2.0],
            vec![1.0, -2.0, 1.0],
        ]);
        assert_abs_diff_eq!(engine.inverse(&a).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_singular() {
        init_logger();
        let engine = EliminationEngine::default();
        let err = engine
            .inverse(&matrix(vec![vec![1.0, 2.0], vec![2.0, 4.0]]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Singular);
        assert_eq!(err, MatrixError::Singular { magnitude: 0.0 });

        // |det| = 1e-12, below the threshold
        let err = engine
            .inverse(&matrix(vec![vec![1e-6, 0.0], vec![0.0, 1e-6]]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Singular);
    }

    #[test]
    fn test_not_square() {
        let err = EliminationEngine::default()
            .inverse(&matrix(vec![vec![1.0, 2.0]]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSquare);
        assert_eq!(err.to_string(), "inverse requires a square matrix, got 1x2");
    }

    #[test]
    fn test_zero_leading_pivot() {
        let a = matrix(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![4.0, -3.0, 8.0],
        ]);

        for strategy in [PivotStrategy::Partial, PivotStrategy::FirstNonZero] {
            let engine = EliminationEngine::new(EngineConfig::default().with_pivoting(strategy));
            let inv = engine.inverse(&a).unwrap();
            assert_abs_diff_eq!(
                multiply(&a, &inv).unwrap(),
                NumericMatrix::identity(3),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_vanishing_pivot() {
        init_logger();
        // det = 1e3 passes the singular check, the last pivot does not
        let a = matrix(vec![
            vec![1e10, 0.0, 0.0],
            vec![0.0, 1e10, 0.0],
            vec![0.0, 0.0, 1e-17],
        ]);
        let err = EliminationEngine::default().inverse(&a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericInstability);
    }

    #[test]
    fn test_product_with_inverse_is_identity() {
        let mut rng = StdRng::seed_from_u64(1234);
        let partial = EliminationEngine::default();
        let naive = EliminationEngine::new(
            EngineConfig::default().with_pivoting(PivotStrategy::FirstNonZero),
        );

        for n in 1..=5 {
            for _ in 0..20 {
                let a = random_matrix(&mut rng, n, n);
                for engine in [&partial, &naive] {
                    match engine.inverse(&a) {
                        Ok(inv) => assert_abs_diff_eq!(
                            multiply(&a, &inv).unwrap(),
                            NumericMatrix::identity(n),
                            epsilon = 1e-6
                        ),
                        Err(err) => assert_eq!(err.kind(), ErrorKind::Singular),
                    }
                }
            }
        }
    }

    #[test]
    fn test_f32() {
        let a = NumericMatrix::<f32>::from_rows(vec![vec![2.0, 0.0], vec![0.0, 4.0]]).unwrap();
        let inv = EliminationEngine::default().inverse(&a).unwrap();
        assert_eq!(inv.to_rows(), vec![vec![0.5f32, 0.0], vec![0.0, 0.25]]);
    }
}
