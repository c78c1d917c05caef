//! Dense matrix algebra for the calculator front ends: determinant, inverse,
//! product, sum, difference and transpose of small floating point matrices.
//!
//! [`facade::MatrixAlgebra`] is the entry point. Enable the `python` feature
//! to build the `matrix_algebra` Python extension module.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod engine {
    pub mod determinant;
    pub mod elimination;
}
pub mod matrix {
    #[allow(clippy::module_inception)]
    pub mod matrix;
    pub mod matrix_ops;
}

pub mod config;
pub mod facade;
pub mod parse;
pub mod result;

#[cfg(feature = "python")]
pub mod python;

#[cfg(test)]
mod testing;

pub use config::{EngineConfig, PivotStrategy};
pub use engine::determinant::{Determinant, DeterminantEngine};
pub use engine::elimination::{EliminationEngine, SINGULAR_EPSILON};
pub use facade::{MatrixAlgebra, Operation, Request};
pub use matrix::matrix::{Element, NumericMatrix, Shape};
pub use result::{ErrorKind, MatrixError, OperationResult, Value};

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn matrix_algebra(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyMatrix>()?;
    m.add_class::<python::PyEngine>()?;
    Ok(())
}
