use crate::matrix::matrix::{Element, NumericMatrix};
use crate::result::MatrixError;
use std::ops;

fn zip_cells<T: Element>(
    operation: &'static str,
    a: &NumericMatrix<T>,
    b: &NumericMatrix<T>,
    f: impl Fn(T, T) -> T,
) -> Result<NumericMatrix<T>, MatrixError> {
    if a.shape() != b.shape() {
        return Err(MatrixError::ShapeMismatch {
            operation,
            lhs: a.shape(),
            rhs: b.shape(),
        });
    }

    NumericMatrix::from_computed(
        operation,
        a.rows(),
        a.cols(),
        a.data()
            .iter()
            .zip(b.data().iter())
            .map(|(x, y)| f(*x, *y))
            .collect(),
    )
}

/// Cellwise `a + b`. Both operands must have the same shape.
pub fn add<T: Element>(
    a: &NumericMatrix<T>,
    b: &NumericMatrix<T>,
) -> Result<NumericMatrix<T>, MatrixError> {
    zip_cells("add", a, b, |x, y| x + y)
}

/// Cellwise `a - b`. Both operands must have the same shape.
pub fn subtract<T: Element>(
    a: &NumericMatrix<T>,
    b: &NumericMatrix<T>,
) -> Result<NumericMatrix<T>, MatrixError> {
    zip_cells("subtract", a, b, |x, y| x - y)
}

/// Matrix product `a × b`, requires `a.cols() == b.rows()`.
pub fn multiply<T: Element>(
    a: &NumericMatrix<T>,
    b: &NumericMatrix<T>,
) -> Result<NumericMatrix<T>, MatrixError> {
    if a.cols() != b.rows() {
        return Err(MatrixError::ShapeMismatch {
            operation: "multiply",
            lhs: a.shape(),
            rhs: b.shape(),
        });
    }

    NumericMatrix::from_computed(
        "multiply",
        a.rows(),
        b.cols(),
        (0..a.rows())
            .flat_map(|i| {
                (0..b.cols()).map(move |j| (0..a.cols()).map(|k| a.at(i, k) * b.at(k, j)).sum())
            })
            .collect(),
    )
}

pub fn transpose<T: Element>(a: &NumericMatrix<T>) -> NumericMatrix<T> {
    NumericMatrix::from_raw(
        a.cols(),
        a.rows(),
        (0..a.cols())
            .flat_map(|c| (0..a.rows()).map(move |r| a.at(r, c)))
            .collect(),
    )
}

/// Multiplies every cell by `k`. A non-finite `k` is rejected as
/// [`MatrixError::InvalidInput`].
pub fn scale<T: Element>(a: &NumericMatrix<T>, k: T) -> Result<NumericMatrix<T>, MatrixError> {
    if !k.is_finite() {
        return Err(MatrixError::InvalidInput(format!(
            "scale factor {} is not a finite number",
            k
        )));
    }

    NumericMatrix::from_computed(
        "scale",
        a.rows(),
        a.cols(),
        a.data().iter().map(|x| *x * k).collect(),
    )
}

impl<T: Element> NumericMatrix<T> {
    pub fn transpose(&self) -> NumericMatrix<T> {
        transpose(self)
    }
}

impl<T: Element> ops::Add<&NumericMatrix<T>> for &NumericMatrix<T> {
    type Output = Result<NumericMatrix<T>, MatrixError>;

    fn add(self, rhs: &NumericMatrix<T>) -> Result<NumericMatrix<T>, MatrixError> {
        add(self, rhs)
    }
}

impl<T: Element> ops::Sub<&NumericMatrix<T>> for &NumericMatrix<T> {
    type Output = Result<NumericMatrix<T>, MatrixError>;

    fn sub(self, rhs: &NumericMatrix<T>) -> Result<NumericMatrix<T>, MatrixError> {
        subtract(self, rhs)
    }
}

impl<T: Element> ops::Mul<&NumericMatrix<T>> for &NumericMatrix<T> {
    type Output = Result<NumericMatrix<T>, MatrixError>;

    fn mul(self, rhs: &NumericMatrix<T>) -> Result<NumericMatrix<T>, MatrixError> {
        multiply(self, rhs)
    }
}

impl<T: Element> ops::Mul<T> for &NumericMatrix<T> {
    type Output = Result<NumericMatrix<T>, MatrixError>;

    fn mul(self, k: T) -> Result<NumericMatrix<T>, MatrixError> {
        scale(self, k)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
