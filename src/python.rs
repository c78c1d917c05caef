use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyFloat, PyType};

use crate::config::{EngineConfig, PivotStrategy};
use crate::engine::determinant::DeterminantEngine;
use crate::engine::elimination::EliminationEngine;
use crate::facade::{MatrixAlgebra, Operation};
use crate::matrix::matrix::NumericMatrix;
use crate::matrix::matrix_ops;
use crate::parse::{parse_cells, CellPolicy};
use crate::result::{MatrixError, OperationResult};

fn value_error(err: MatrixError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Right-hand side of `Matrix * x`.
#[derive(FromPyObject)]
pub enum Factor<'py> {
    Matrix(PyRef<'py, PyMatrix>),
    Scalar(f64),
}

#[derive(Debug)]
#[pyclass(frozen, name = "Matrix")]
pub struct PyMatrix {
    pub inner: NumericMatrix,
}

impl From<NumericMatrix> for PyMatrix {
    fn from(inner: NumericMatrix) -> Self {
        PyMatrix { inner }
    }
}

#[pymethods]
impl PyMatrix {
    #[classmethod]
    pub fn from_list(_cls: &Bound<PyType>, lines: Vec<Vec<f64>>) -> PyResult<Self> {
        match NumericMatrix::from_rows(lines) {
            Ok(inner) => Ok(inner.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    /// Form cells as strings. Bad cells become 0 unless `strict` is set.
    #[classmethod]
    #[pyo3(signature = (lines, strict=false))]
    pub fn from_strings(
        _cls: &Bound<PyType>,
        lines: Vec<Vec<String>>,
        strict: bool,
    ) -> PyResult<Self> {
        let policy = if strict {
            CellPolicy::Strict
        } else {
            CellPolicy::Lenient
        };
        match parse_cells(&lines, policy) {
            Ok(inner) => Ok(inner.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    pub fn to_list(&self) -> Vec<Vec<f64>> {
        self.inner.to_rows()
    }

    #[getter]
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[getter]
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    #[getter]
    #[allow(non_snake_case)]
    pub fn T(&self) -> PyMatrix {
        self.inner.transpose().into()
    }

    pub fn __add__(&self, rhs: &PyMatrix) -> PyResult<PyMatrix> {
        match matrix_ops::add(&self.inner, &rhs.inner) {
            Ok(result) => Ok(result.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    pub fn __sub__(&self, rhs: &PyMatrix) -> PyResult<PyMatrix> {
        match matrix_ops::subtract(&self.inner, &rhs.inner) {
            Ok(result) => Ok(result.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    /// Matrix product, or scaling when `rhs` is a number.
    pub fn __mul__(&self, rhs: Factor<'_>) -> PyResult<PyMatrix> {
        let result = match rhs {
            Factor::Matrix(rhs) => matrix_ops::multiply(&self.inner, &rhs.inner),
            Factor::Scalar(k) => matrix_ops::scale(&self.inner, k),
        };
        match result {
            Ok(result) => Ok(result.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    pub fn __rmul__(&self, k: f64) -> PyResult<PyMatrix> {
        match matrix_ops::scale(&self.inner, k) {
            Ok(result) => Ok(result.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    pub fn determinant(&self) -> PyResult<f64> {
        DeterminantEngine::default()
            .value(&self.inner)
            .map_err(value_error)
    }

    pub fn inverse(&self) -> PyResult<PyMatrix> {
        match EliminationEngine::default().inverse(&self.inner) {
            Ok(result) => Ok(result.into()),
            Err(error) => Err(value_error(error)),
        }
    }

    pub fn __repr__(&self) -> String {
        format!("Matrix({:?})", self.inner.to_rows())
    }

    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

#[pyclass(frozen, name = "Engine")]
pub struct PyEngine {
    inner: MatrixAlgebra,
}

#[pymethods]
impl PyEngine {
    #[new]
    #[pyo3(signature = (trace=false, cofactor_limit=8, pivoting="partial", threads=0))]
    pub fn new(
        trace: bool,
        cofactor_limit: usize,
        pivoting: &str,
        threads: usize,
    ) -> PyResult<Self> {
        let pivoting = pivoting
            .parse::<PivotStrategy>()
            .map_err(PyValueError::new_err)?;

        Ok(PyEngine {
            inner: MatrixAlgebra::new(
                EngineConfig::new()
                    .with_trace(trace)
                    .with_cofactor_limit(cofactor_limit)
                    .with_pivoting(pivoting)
                    .with_threads(threads),
            ),
        })
    }

    /// Returns a `Matrix` or a `float`; failures raise `ValueError`.
    #[pyo3(signature = (operation, a, b=None))]
    pub fn evaluate(
        &self,
        py: Python<'_>,
        operation: &str,
        a: &PyMatrix,
        b: Option<PyRef<'_, PyMatrix>>,
    ) -> PyResult<PyObject> {
        let operation = operation.parse::<Operation>().map_err(value_error)?;

        match self
            .inner
            .evaluate(operation, &a.inner, b.as_ref().map(|b| &b.inner))
        {
            OperationResult::Matrix(m) => Ok(Py::new(py, PyMatrix::from(m))?.into_any()),
            OperationResult::Scalar(x) => Ok(PyFloat::new(py, x).into_any().unbind()),
            OperationResult::Error { kind, message } => {
                Err(PyValueError::new_err(format!("{}: {}", kind, message)))
            }
        }
    }

    /// `(determinant, derivation lines)`
    pub fn determinant_trace(&self, a: &PyMatrix) -> PyResult<(f64, Vec<String>)> {
        let det = self
            .inner
            .determinant_with_trace(&a.inner)
            .map_err(value_error)?;
        Ok((det.value, det.trace))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
