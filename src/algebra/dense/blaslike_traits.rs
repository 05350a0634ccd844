#![allow(non_snake_case)]
use crate::algebra::{DenseFactorizationError, DenseMatrix, Matrix};

pub trait FactorEigen {
    type T;
    // computes eigenvalues only (full set).  Only the upper
    // triangle of A is referenced.  A is used as workspace.
    fn eigvals(&mut self, A: &mut Matrix<Self::T>) -> Result<(), DenseFactorizationError>;
    // computes eigenvalues and vectors (full set)
    fn eigen(&mut self, A: &mut Matrix<Self::T>) -> Result<(), DenseFactorizationError>;
}

pub trait FactorCholesky {
    type T;
    // computes the Cholesky decomposition.  Only the upper
    // part of the input A will be referenced. The Cholesky factor
    // is stored in self.L
    fn factor(&mut self, A: &Matrix<Self::T>) -> Result<(), DenseFactorizationError>;

    // Solve AX = B, where B is matrix with (possibly) multiple columns.
    // Uses previously computed factor from the `factor` function.
    // B is modified in place and stores X after call.
    fn solve(&self, B: &mut Matrix<Self::T>);

    // computes log(det(X)) for the matrix X = LL^T
    fn logdet(&self) -> Self::T;
}

pub trait MultiplySYRK {
    type T;
    fn syrk<MATA>(&mut self, A: &MATA, α: Self::T, β: Self::T) -> &Self
    where
        MATA: DenseMatrix<T = Self::T>;
}

pub trait MultiplyGEMM {
    type T;
    fn mul<MATA, MATB>(&mut self, A: &MATA, B: &MATB, α: Self::T, β: Self::T) -> &Self
    where
        MATB: DenseMatrix<T = Self::T>,
        MATA: DenseMatrix<T = Self::T>;
}
