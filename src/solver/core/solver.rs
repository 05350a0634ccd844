use thiserror::Error;

/// Status of solver at termination

#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run).
    #[default]
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Iteration limit reached before a solution was found.
    MaxIterations,
    /// Time limit reached before a solution was found.
    MaxTime,
    /// Solver terminated with a numerical error
    NumericalError,
    /// Solver terminated due to lack of progress.
    InsufficientProgress,
}

impl SolverStatus {
    pub(crate) fn is_errored(&self) -> bool {
        // status is any of the error codes
        matches!(
            *self,
            SolverStatus::NumericalError | SolverStatus::InsufficientProgress
        )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error type returned when constructing a solver from inconsistent data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Problem data and block dimensions do not agree
    #[error("Incompatible dimension: {0}")]
    IncompatibleDimension(&'static str),
    /// Problem data contains NaN or infinite values
    #[error("Problem data contains non-finite values")]
    NonFiniteData,
    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    BadSettings(#[from] super::SettingsError),
}
