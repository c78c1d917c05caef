/// How the elimination engine picks the pivot row for each column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotStrategy {
    /// Largest absolute value in the pivot column.
    #[default]
    Partial,
    /// First row with a non-zero entry in the pivot column.
    FirstNonZero,
}

impl std::str::FromStr for PivotStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" => Ok(PivotStrategy::Partial),
            "first_non_zero" | "first-non-zero" | "naive" => Ok(PivotStrategy::FirstNonZero),
            other => Err(format!("unknown pivot strategy '{}'", other)),
        }
    }
}

/// Knobs shared by the engines and the facade.
///
/// The singular threshold is a fixed constant and not part of this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Record a cofactor-by-cofactor derivation of each determinant.
    pub trace: bool,
    /// Largest size evaluated by cofactor expansion. Bigger matrices use LU.
    pub cofactor_limit: usize,
    pub pivoting: PivotStrategy,
    /// Worker threads for batch evaluation, 0 uses the global rayon pool.
    pub threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trace: false,
            cofactor_limit: 8,
            pivoting: PivotStrategy::Partial,
            threads: 0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_cofactor_limit(mut self, limit: usize) -> Self {
        self.cofactor_limit = limit;
        self
    }

    pub fn with_pivoting(mut self, pivoting: PivotStrategy) -> Self {
        self.pivoting = pivoting;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
