use itertools::{iproduct, Itertools};
use std::cmp::Ordering;

use crate::config::EngineConfig;
use crate::matrix::matrix::{Element, NumericMatrix};
use crate::result::MatrixError;

/// A determinant together with the steps that produced it.
///
/// `trace` is only filled when [`EngineConfig::trace`] is set. It lists every
/// first-row cofactor term (zero entries included, marked as skipped) and the
/// sum of each expansion level, innermost levels first, indented by depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Determinant<T> {
    pub value: T,
    pub trace: Vec<String>,
}

/// Laplace expansion along the first row, LU for anything above
/// `cofactor_limit`.
#[derive(Debug, Clone, Default)]
pub struct DeterminantEngine {
    config: EngineConfig,
}

impl DeterminantEngine {
    pub fn new(config: EngineConfig) -> Self {
        DeterminantEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn determinant<T: Element>(
        &self,
        a: &NumericMatrix<T>,
    ) -> Result<Determinant<T>, MatrixError> {
        if !a.is_square() {
            return Err(MatrixError::NotSquare {
                operation: "determinant",
                shape: a.shape(),
            });
        }

        let n = a.rows();
        let mut trace = vec![];

        let value = if n > self.config.cofactor_limit {
            log::debug!(
                "{} determinant above cofactor limit {}, using LU decomposition",
                a.shape(),
                self.config.cofactor_limit
            );
            let (value, swaps) = lu_determinant(a);
            if self.config.trace {
                trace.push(format!(
                    "LU decomposition with partial pivoting: {} row swap(s), det = {}",
                    swaps, value
                ));
            }
            value
        } else {
            let mut tracer = Tracer {
                enabled: self.config.trace,
                lines: &mut trace,
            };
            expand(a, 0, &mut tracer)
        };

        if !value.is_finite() {
            log::warn!("{} determinant overflowed", a.shape());
            return Err(MatrixError::Overflow {
                operation: "determinant",
            });
        }

        Ok(Determinant { value, trace })
    }

    /// Shortcut for callers that only want the scalar.
    pub fn value<T: Element>(&self, a: &NumericMatrix<T>) -> Result<T, MatrixError> {
        Ok(self.determinant(a)?.value)
    }
}

struct Tracer<'a> {
    enabled: bool,
    lines: &'a mut Vec<String>,
}

impl Tracer<'_> {
    fn record(&mut self, depth: usize, line: impl FnOnce() -> String) {
        if self.enabled {
            self.lines.push(format!("{}{}", "  ".repeat(depth), line()));
        }
    }
}

fn expand<T: Element>(a: &NumericMatrix<T>, depth: usize, tracer: &mut Tracer) -> T {
    let n = a.rows();

    if n == 1 {
        let value = a.at(0, 0);
        tracer.record(depth, || format!("det(1x1) = {}", value));
        return value;
    }

    if n == 2 {
        let value = a.at(0, 0) * a.at(1, 1) - a.at(0, 1) * a.at(1, 0);
        tracer.record(depth, || {
            format!(
                "det(2x2) = {}*{} - {}*{} = {}",
                a.at(0, 0),
                a.at(1, 1),
                a.at(0, 1),
                a.at(1, 0),
                value
            )
        });
        return value;
    }

    let mut terms = vec![];
    for j in 0..n {
        let entry = a.at(0, j);
        if entry == T::zero() {
            tracer.record(depth, || format!("a[0][{}] = 0, term skipped", j));
            continue;
        }

        let minor_det = expand(&minor(a, 0, j), depth + 1, tracer);
        let sign = if j % 2 == 0 { T::one() } else { -T::one() };
        let term = sign * entry * minor_det;
        tracer.record(depth, || {
            format!(
                "{} {} * det(M[0][{}]) = {} {} * {} = {}",
                if j % 2 == 0 { '+' } else { '-' },
                entry,
                j,
                if j % 2 == 0 { '+' } else { '-' },
                entry,
                minor_det,
                term
            )
        });
        terms.push(term);
    }

    let value = terms.iter().fold(T::zero(), |acc, t| acc + *t);
    tracer.record(depth, || {
        format!(
            "det({}x{}) = {} = {}",
            n,
            n,
            if terms.is_empty() {
                "0".to_string()
            } else {
                terms.iter().join(" + ")
            },
            value
        )
    });
    value
}

/// The submatrix left after deleting `row` and `col`. Needs at least 2 rows
/// and 2 columns.
pub fn minor<T: Element>(a: &NumericMatrix<T>, row: usize, col: usize) -> NumericMatrix<T> {
    NumericMatrix::from_raw(
        a.rows() - 1,
        a.cols() - 1,
        iproduct!(0..a.rows(), 0..a.cols())
            .filter(|&(r, c)| r != row && c != col)
            .map(|(r, c)| a.at(r, c))
            .collect(),
    )
}

/// Returns the determinant and the number of row swaps performed.
fn lu_determinant<T: Element>(a: &NumericMatrix<T>) -> (T, usize) {
    let n = a.rows();
    let mut lu = a.data().to_vec();
    let mut det = T::one();
    let mut swaps = 0;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&x, &y| {
                lu[x * n + col]
                    .abs()
                    .partial_cmp(&lu[y * n + col].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(col);

        let pivot = lu[pivot_row * n + col];
        if pivot == T::zero() {
            return (T::zero(), swaps);
        }

        if pivot_row != col {
            for k in 0..n {
                lu.swap(col * n + k, pivot_row * n + k);
            }
            swaps += 1;
            det = -det;
        }
        det = det * pivot;

        for row in col + 1..n {
            let factor = lu[row * n + col] / pivot;
            for k in col..n {
                lu[row * n + k] = lu[row * n + k] - factor * lu[col * n + k];
            }
        }
    }

    (det, swaps)
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
