use approx::{AbsDiffEq, RelativeEq};
use itertools::Itertools;
use num_traits::Float;

use crate::result::MatrixError;
use std::fmt;
use std::ops::Index;

pub trait Element:  // Avoid repeating all the traits
    Float
    + std::iter::Sum<Self>
    + std::fmt::Display
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> Element for T where
    T: Float
        + std::iter::Sum<T>
        + std::fmt::Display
        + std::fmt::Debug
        + Send
        + Sync
        + 'static
{
}

/// Row and column count of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A dense, row-major matrix of floating point cells.
///
/// The shape is fixed at construction and the cells are never mutated
/// afterwards: every operation in this crate allocates a new matrix for its
/// output. Values handed in by callers must be finite; blank or unparseable
/// form cells are the caller's business (see [`crate::parse`]).
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMatrix<T = f64> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> NumericMatrix<T> {
    /// Builds a `rows x cols` matrix from row-major `data`.
    ///
    /// Fails with [`MatrixError::InvalidInput`] when a dimension is zero, when
    /// `data` does not hold exactly `rows * cols` cells, or when a cell is
    /// `NaN` or infinite.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidInput(format!(
                "a matrix needs at least one row and one column, got {}",
                Shape::new(rows, cols)
            )));
        }
        let len = rows.checked_mul(cols).ok_or_else(|| {
            MatrixError::InvalidInput(format!("a {} matrix is too large", Shape::new(rows, cols)))
        })?;
        if data.len() != len {
            return Err(MatrixError::InvalidInput(format!(
                "a {} matrix holds {} cells, got {}",
                Shape::new(rows, cols),
                len,
                data.len()
            )));
        }
        if let Some(idx) = data.iter().position(|x| !x.is_finite()) {
            return Err(MatrixError::InvalidInput(format!(
                "cell ({}, {}) is not a finite number",
                idx / cols,
                idx % cols
            )));
        }

        Ok(NumericMatrix { rows, cols, data })
    }

    /// Builds a matrix from a list of rows. Ragged input is rejected.
    pub fn from_rows(lines: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let rows = lines.len();
        let cols = lines.first().map(|l| l.len()).unwrap_or(0);

        if let Some(row) = lines.iter().position(|l| l.len() != cols) {
            return Err(MatrixError::InvalidInput(format!(
                "row {} has {} cells, expected {}",
                row,
                lines[row].len(),
                cols
            )));
        }

        NumericMatrix::new(rows, cols, lines.into_iter().flatten().collect())
    }

    /// Caller guarantees `data.len() == rows * cols` and both dimensions are
    /// non-zero. Used by the engines for their freshly computed outputs.
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        debug_assert_eq!(data.len(), rows * cols);
        NumericMatrix { rows, cols, data }
    }

    /// Like [`NumericMatrix::from_raw`] for arithmetic results, which may
    /// have left the finite range.
    pub(crate) fn from_computed(
        operation: &'static str,
        rows: usize,
        cols: usize,
        data: Vec<T>,
    ) -> Result<Self, MatrixError> {
        if data.iter().any(|x| !x.is_finite()) {
            log::warn!("{} of a {} result overflowed", operation, Shape::new(rows, cols));
            return Err(MatrixError::Overflow { operation });
        }
        Ok(NumericMatrix::from_raw(rows, cols, data))
    }

    /// The `n x n` identity matrix.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn identity(n: usize) -> Self {
        assert!(n > 0, "identity matrix must have at least one row");
        NumericMatrix::from_raw(
            n,
            n,
            (0..n)
                .flat_map(|i| (0..n).map(move |j| if i == j { T::one() } else { T::zero() }))
                .collect(),
        )
    }

    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dimensions must be non-zero");
        NumericMatrix::from_raw(rows, cols, vec![T::zero(); rows * cols])
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        Shape::new(self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Cell at `(row, col)`. Out of range indices panic like slice indexing.
    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Row-major view of all cells.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.cols).map(|line| line.to_vec()).collect()
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

impl<T: Element> Index<(usize, usize)> for NumericMatrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for a {} matrix",
            self.shape()
        );
        &self.data[row * self.cols + col]
    }
}

/// One bracketed row per line. A precision (`{:.3}`) is applied to every cell.
impl<T: Element> fmt::Display for NumericMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision();
        let lines = self.data.chunks(self.cols).map(|line| {
            let cells = line
                .iter()
                .map(|x| match precision {
                    Some(p) => format!("{:.*}", p, x),
                    None => format!("{}", x),
                })
                .join(", ");
            format!("[{}]", cells)
        });
        write!(f, "{}", lines.format("\n"))
    }
}

impl<T> AbsDiffEq for NumericMatrix<T>
where
    T: Element + AbsDiffEq<Epsilon = T>,
{
    type Epsilon = T;

    fn default_epsilon() -> T {
        <T as AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T> RelativeEq for NumericMatrix<T>
where
    T: Element + RelativeEq<Epsilon = T>,
{
    fn default_max_relative() -> T {
        <T as RelativeEq>::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T, max_relative: T) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_rows() {
        let m = NumericMatrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), Shape::new(2, 3));
        assert_eq!(m.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.at(0, 2), 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 3), None);
        assert_eq!(
            m.to_rows(),
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
    }

    #[test]
    fn test_rejects_malformed_input() {
        let err = NumericMatrix::<f64>::new(0, 3, vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = NumericMatrix::new(2, 2, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = NumericMatrix::new(1, 2, vec![1.0, f64::NAN]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("(0, 1)"));

        let err = NumericMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = NumericMatrix::<f64>::from_rows(vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rejects_dimensions_past_usize() {
        let err = NumericMatrix::<f64>::new(usize::MAX / 2 + 1, 2, vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().ends_with("matrix is too large"));

        let err = NumericMatrix::<f64>::new(usize::MAX, usize::MAX, vec![1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_identity_and_zeros() {
        let id = NumericMatrix::<f64>::identity(3);
        assert_eq!(
            id.to_rows(),
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0]
            ]
        );
        assert!(id.is_square());

        let z = NumericMatrix::<f32>::zeros(2, 3);
        assert_eq!(z.shape(), Shape::new(2, 3));
        assert!(z.data().iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_display() {
        let m = NumericMatrix::from_rows(vec![vec![1.0, 0.5], vec![-2.0, 1.0 / 3.0]]).unwrap();
        assert_eq!(format!("{:.3}", m), "[1.000, 0.500]\n[-2.000, 0.333]");
        assert_eq!(format!("{}", m.shape()), "2x2");

        let row = NumericMatrix::from_rows(vec![vec![1.5, 2.0]]).unwrap();
        assert_eq!(row.to_string(), "[1.5, 2]");
    }

    #[test]
    fn test_approx_eq() {
        let a = NumericMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        let b = NumericMatrix::from_rows(vec![vec![1.0 + 1e-9, 2.0 - 1e-9]]).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        assert!(!a.abs_diff_eq(&b, 1e-12));

        let c = NumericMatrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(!a.abs_diff_eq(&c, 1.0));
    }
}
