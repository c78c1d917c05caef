use rayon::prelude::*;
use rayon::ThreadPool;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::engine::determinant::{Determinant, DeterminantEngine};
use crate::engine::elimination::EliminationEngine;
use crate::matrix::matrix::{Element, NumericMatrix};
use crate::matrix::matrix_ops;
use crate::result::{MatrixError, OperationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Determinant,
    Inverse,
    Transpose,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Determinant,
        Operation::Inverse,
        Operation::Transpose,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Determinant => "determinant",
            Operation::Inverse => "inverse",
            Operation::Transpose => "transpose",
        }
    }

    /// Whether the operation takes a second matrix.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Operation::Add | Operation::Subtract | Operation::Multiply
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, MatrixError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Operation::Add),
            "subtract" | "sub" => Ok(Operation::Subtract),
            "multiply" | "mul" => Ok(Operation::Multiply),
            "determinant" | "det" => Ok(Operation::Determinant),
            "inverse" | "inv" => Ok(Operation::Inverse),
            "transpose" => Ok(Operation::Transpose),
            other => Err(MatrixError::InvalidInput(format!(
                "unknown operation '{}'",
                other
            ))),
        }
    }
}

/// One entry of a batch handed to [`MatrixAlgebra::evaluate_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request<T = f64> {
    pub operation: Operation,
    pub lhs: NumericMatrix<T>,
    pub rhs: Option<NumericMatrix<T>>,
}

impl<T: Element> Request<T> {
    pub fn unary(operation: Operation, lhs: NumericMatrix<T>) -> Self {
        Request {
            operation,
            lhs,
            rhs: None,
        }
    }

    pub fn binary(operation: Operation, lhs: NumericMatrix<T>, rhs: NumericMatrix<T>) -> Self {
        Request {
            operation,
            lhs,
            rhs: Some(rhs),
        }
    }
}

/// Single entry point of the engine.
///
/// Routes an [`Operation`] to the matrix operations or to the determinant and
/// elimination engines, and folds whatever they return into an
/// [`OperationResult`]. Shape and singularity checks all happen in the
/// engines; this only checks that binary operations got their second operand.
///
/// Holds no mutable state, so one instance can serve concurrent callers.
/// Clones share the batch thread pool.
#[derive(Debug, Clone, Default)]
pub struct MatrixAlgebra {
    config: EngineConfig,
    determinant: DeterminantEngine,
    elimination: EliminationEngine,
    pool: Option<Arc<ThreadPool>>,
}

impl MatrixAlgebra {
    /// Builds the batch pool up front when `config.threads > 0`. A pool that
    /// cannot be built leaves batches on rayon's global pool.
    pub fn new(config: EngineConfig) -> Self {
        MatrixAlgebra {
            determinant: DeterminantEngine::new(config.clone()),
            elimination: EliminationEngine::new(config.clone()),
            pool: batch_pool(config.threads),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates `operation`. `b` is required for add, subtract and multiply
    /// and ignored by the other operations.
    pub fn evaluate<T: Element>(
        &self,
        operation: Operation,
        a: &NumericMatrix<T>,
        b: Option<&NumericMatrix<T>>,
    ) -> OperationResult<T> {
        log::debug!(
            "evaluating {} on {}{}",
            operation,
            a.shape(),
            b.filter(|_| operation.is_binary())
                .map(|b| format!(" and {}", b.shape()))
                .unwrap_or_default()
        );

        let result: OperationResult<T> = match operation {
            Operation::Add => rhs(operation, b)
                .and_then(|b| matrix_ops::add(a, b))
                .into(),
            Operation::Subtract => rhs(operation, b)
                .and_then(|b| matrix_ops::subtract(a, b))
                .into(),
            Operation::Multiply => rhs(operation, b)
                .and_then(|b| matrix_ops::multiply(a, b))
                .into(),
            Operation::Determinant => self
                .determinant
                .determinant(a)
                .map(|det| {
                    for line in &det.trace {
                        log::debug!("{}", line);
                    }
                    det.value
                })
                .into(),
            Operation::Inverse => self.elimination.inverse(a).into(),
            Operation::Transpose => OperationResult::Matrix(matrix_ops::transpose(a)),
        };

        if let OperationResult::Error { kind, message } = &result {
            log::debug!("{} failed ({}): {}", operation, kind, message);
        }
        result
    }

    /// Determinant plus its derivation, regardless of [`EngineConfig::trace`].
    pub fn determinant_with_trace<T: Element>(
        &self,
        a: &NumericMatrix<T>,
    ) -> Result<Determinant<T>, MatrixError> {
        DeterminantEngine::new(self.config.clone().with_trace(true)).determinant(a)
    }

    /// Evaluates independent requests in parallel. Results keep the order of
    /// `requests`.
    pub fn evaluate_batch<T: Element>(&self, requests: &[Request<T>]) -> Vec<OperationResult<T>> {
        let run = || -> Vec<OperationResult<T>> {
            requests
                .par_iter()
                .map(|r| self.evaluate(r.operation, &r.lhs, r.rhs.as_ref()))
                .collect()
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Number of threads batches run on.
    pub fn batch_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

fn batch_pool(threads: usize) -> Option<Arc<ThreadPool>> {
    if threads == 0 {
        return None;
    }

    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            log::warn!(
                "could not build a {}-thread pool ({}), using the global pool",
                threads,
                err
            );
            None
        }
    }
}

fn rhs<T>(
    operation: Operation,
    b: Option<&NumericMatrix<T>>,
) -> Result<&NumericMatrix<T>, MatrixError> {
    b.ok_or(MatrixError::MissingOperand {
        operation: operation.name(),
    })
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
