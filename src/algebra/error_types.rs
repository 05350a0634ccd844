use thiserror::Error;

/// Error type returned by the dense factorization routines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Matrix contains non-finite values")]
    NonFinite,
    #[error("Eigendecomposition failed to converge within {0} iterations")]
    Eigen(usize),
    #[error("Cholesky factorization failed, matrix is not positive definite")]
    Cholesky,
}
