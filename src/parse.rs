//! Turning calculator form cells into a [`NumericMatrix`].
//!
//! The calculators treat blank or unreadable cells as `0`. That policy is
//! kept here, at the form boundary, as [`CellPolicy::Lenient`]; the matrix
//! constructors themselves never guess. [`CellPolicy::Strict`] reports the
//! first bad cell instead.

use crate::matrix::matrix::NumericMatrix;
use crate::result::MatrixError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellPolicy {
    /// Blank, unparseable and non-finite cells become `0.0`.
    #[default]
    Lenient,
    Strict,
}

/// Parses one cell located at `(row, col)`, surrounding whitespace ignored.
pub fn parse_cell(
    text: &str,
    row: usize,
    col: usize,
    policy: CellPolicy,
) -> Result<f64, MatrixError> {
    let text = text.trim();
    let parsed = text.parse::<f64>().ok().filter(|x| x.is_finite());

    match (parsed, policy) {
        (Some(x), _) => Ok(x),
        (None, CellPolicy::Lenient) => {
            if !text.is_empty() {
                log::debug!("cell ({}, {}) '{}' is not a number, using 0", row, col, text);
            }
            Ok(0.0)
        }
        (None, CellPolicy::Strict) if text.is_empty() => Err(MatrixError::InvalidInput(format!(
            "cell ({}, {}) is empty",
            row, col
        ))),
        (None, CellPolicy::Strict) => Err(MatrixError::InvalidInput(format!(
            "cell ({}, {}) '{}' is not a finite number",
            row, col, text
        ))),
    }
}

/// Parses a grid of form cells. The grid itself must be rectangular and
/// non-empty under either policy.
pub fn parse_cells<S: AsRef<str>>(
    cells: &[Vec<S>],
    policy: CellPolicy,
) -> Result<NumericMatrix, MatrixError> {
    let lines = cells
        .iter()
        .enumerate()
        .map(|(r, line)| {
            line.iter()
                .enumerate()
                .map(|(c, cell)| parse_cell(cell.as_ref(), r, c, policy))
                .collect::<Result<Vec<f64>, MatrixError>>()
        })
        .collect::<Result<Vec<Vec<f64>>, MatrixError>>()?;

    NumericMatrix::from_rows(lines)
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
