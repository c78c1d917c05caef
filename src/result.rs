//! Error taxonomy and the tagged result handed to the presentation layer.

use crate::matrix::matrix::{Element, NumericMatrix, Shape};
use std::fmt;
use thiserror::Error;

/// Stable classification of a failed operation. The presentation layer keys
/// its user-facing messages on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShapeMismatch,
    NotSquare,
    Singular,
    NumericInstability,
    InvalidInput,
    MissingOperand,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ShapeMismatch => "shape_mismatch",
            ErrorKind::NotSquare => "not_square",
            ErrorKind::Singular => "singular",
            ErrorKind::NumericInstability => "numeric_instability",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::MissingOperand => "missing_operand",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Operand dimensions do not fit the requested operation.
    #[error("cannot {operation} a {lhs} matrix and a {rhs} matrix")]
    ShapeMismatch {
        operation: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    #[error("{operation} requires a square matrix, got {shape}")]
    NotSquare { operation: &'static str, shape: Shape },

    /// `|det|` fell below [`crate::engine::elimination::SINGULAR_EPSILON`].
    #[error("matrix is singular (|det| = {magnitude:e})")]
    Singular { magnitude: f64 },

    /// A pivot vanished after the determinant check passed.
    #[error("elimination became unstable at column {column} (pivot {pivot:e})")]
    NumericInstability { column: usize, pivot: f64 },

    /// Finite operands produced an infinite or `NaN` result.
    #[error("{operation} overflowed the floating point range")]
    Overflow { operation: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} needs a second matrix")]
    MissingOperand { operation: &'static str },
}

impl MatrixError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatrixError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            MatrixError::NotSquare { .. } => ErrorKind::NotSquare,
            MatrixError::Singular { .. } => ErrorKind::Singular,
            MatrixError::NumericInstability { .. } | MatrixError::Overflow { .. } => {
                ErrorKind::NumericInstability
            }
            MatrixError::InvalidInput(_) => ErrorKind::InvalidInput,
            MatrixError::MissingOperand { .. } => ErrorKind::MissingOperand,
        }
    }
}

/// Outcome of a single facade call. Exactly one variant, never a partial
/// result.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T = f64> {
    Matrix(NumericMatrix<T>),
    Scalar(T),
    Error { kind: ErrorKind, message: String },
}

impl<T: Element> OperationResult<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, OperationResult::Error { .. })
    }

    /// The error kind, if this is an error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            OperationResult::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&NumericMatrix<T>> {
        match self {
            OperationResult::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<T> {
        match self {
            OperationResult::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    /// Splits the result back into a value or an `(kind, message)` pair.
    pub fn into_result(self) -> Result<Value<T>, (ErrorKind, String)> {
        match self {
            OperationResult::Matrix(m) => Ok(Value::Matrix(m)),
            OperationResult::Scalar(x) => Ok(Value::Scalar(x)),
            OperationResult::Error { kind, message } => Err((kind, message)),
        }
    }
}

/// Successful payload of an [`OperationResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T = f64> {
    Matrix(NumericMatrix<T>),
    Scalar(T),
}

impl<T> From<MatrixError> for OperationResult<T> {
    fn from(err: MatrixError) -> Self {
        OperationResult::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl<T> From<Result<NumericMatrix<T>, MatrixError>> for OperationResult<T> {
    fn from(res: Result<NumericMatrix<T>, MatrixError>) -> Self {
        match res {
            Ok(m) => OperationResult::Matrix(m),
            Err(err) => err.into(),
        }
    }
}

impl<T: Element> From<Result<T, MatrixError>> for OperationResult<T> {
    fn from(res: Result<T, MatrixError>) -> Self {
        match res {
            Ok(x) => OperationResult::Scalar(x),
            Err(err) => err.into(),
        }
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_messages() {
        let err = MatrixError::ShapeMismatch {
            operation: "add",
            lhs: Shape::new(1, 2),
            rhs: Shape::new(2, 1),
        };
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert_eq!(err.to_string(), "cannot add a 1x2 matrix and a 2x1 matrix");

        let err = MatrixError::NotSquare {
            operation: "determinant",
            shape: Shape::new(2, 3),
        };
        assert_eq!(err.kind(), ErrorKind::NotSquare);
        assert_eq!(err.to_string(), "determinant requires a square matrix, got 2x3");

        assert_eq!(ErrorKind::NumericInstability.as_str(), "numeric_instability");
        assert_eq!(ErrorKind::Singular.to_string(), "singular");
    }

    #[test]
    fn test_operation_result_conversions() {
        let ok: Result<f64, MatrixError> = Ok(-2.0);
        let res: OperationResult = ok.into();
        assert_eq!(res.as_scalar(), Some(-2.0));
        assert!(!res.is_error());
        assert_eq!(res.kind(), None);

        let m = NumericMatrix::<f64>::identity(2);
        let ok: Result<NumericMatrix, MatrixError> = Ok(m.clone());
        let res: OperationResult = ok.into();
        assert_eq!(res.as_matrix(), Some(&m));
        assert_eq!(res.into_result(), Ok(Value::Matrix(m)));

        let err: Result<NumericMatrix, MatrixError> = Err(MatrixError::Singular { magnitude: 0.0 });
        let res: OperationResult = err.into();
        assert!(res.is_error());
        assert_eq!(res.kind(), Some(ErrorKind::Singular));
        assert!(res.as_matrix().is_none());
        let (kind, message) = res.into_result().unwrap_err();
        assert_eq!(kind, ErrorKind::Singular);
        assert!(message.starts_with("matrix is singular"));
    }
}
