#![allow(non_snake_case)]

use crate::algebra::{
    AsFloatT, DenseFactorizationError, FactorCholesky, FloatT, Matrix, MatrixShape, ShapedMatrix,
};

pub struct CholeskyEngine<T> {
    /// lower triangular factor (stored as square dense)
    pub L: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let L = Matrix::<T>::zeros((n, n));
        Self { L }
    }

    /// Overwrite `M` with `L^{-1}`
    pub fn inverse_factor(&self, M: &mut Matrix<T>) {
        assert_eq!(M.size(), self.L.size());
        M.set_identity();
        let n = self.L.nrows();
        let ok = T::xtrsm(MatrixShape::N, n, &self.L.data, &mut M.data, n);
        assert!(ok);
    }
}

impl<T> FactorCholesky for CholeskyEngine<T>
where
    T: FloatT,
{
    type T = T;
    fn factor(&mut self, A: &Matrix<Self::T>) -> Result<(), DenseFactorizationError> {
        if A.size() != self.L.size() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        T::xpotrf(A.nrows(), &A.data, &mut self.L.data)
    }

    fn solve(&self, B: &mut Matrix<Self::T>) {
        assert_eq!(B.nrows(), self.L.nrows());

        // LL'X = B as two triangular solves
        let (n, nrhs) = B.size();
        let ok = T::xtrsm(MatrixShape::N, n, &self.L.data, &mut B.data, nrhs)
            && T::xtrsm(MatrixShape::T, n, &self.L.data, &mut B.data, nrhs);
        assert!(ok);
    }

    fn logdet(&self) -> T {
        let two: T = (2.).as_T();
        let mut ld = T::zero();
        for i in 0..self.L.nrows() {
            ld += T::ln(self.L[(i, i)]);
        }
        ld * two
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{DenseMatrix, MultiplyGEMM, VectorMath};

    #[test]
    fn test_cholesky() {
        #[rustfmt::skip]
        let S = Matrix::from(
            &[[ 8., -2., 4.],
              [-2., 12., 2.],
              [ 4.,  2., 6.]]);

        let mut eng = CholeskyEngine::<f64>::new(3);
        assert!(eng.factor(&S).is_ok());

        // strictly lower factor
        assert_eq!(eng.L[(0, 2)], 0.);

        let mut M = Matrix::<f64>::zeros((3, 3));
        M.mul(&eng.L, &eng.L.t(), 1.0, 0.0);

        assert!(M.data().norm_inf_diff(S.data()) < 1e-8);

        // determinant of S is 8*(72-4) + 2*(-12-8) + 4*(-4-48) = 296
        assert!((eng.logdet() - f64::ln(296.)).abs() < 1e-10);

        // solve S X = B for B = S, giving the identity
        let mut B = S.clone();
        eng.solve(&mut B);
        assert!(B.data().norm_inf_diff(Matrix::<f64>::identity(3).data()) < 1e-10);

        // L^{-1} L = I
        let mut Linv = Matrix::<f64>::zeros((3, 3));
        eng.inverse_factor(&mut Linv);
        M.mul(&Linv, &eng.L, 1.0, 0.0);
        assert!(M.data().norm_inf_diff(Matrix::<f64>::identity(3).data()) < 1e-10);
    }

    #[test]
    fn test_cholesky_reads_upper_triangle() {
        // lower triangle is garbage and must be ignored
        let S = Matrix::from(&[[4., 2.], [-7., 5.]]);
        let mut eng = CholeskyEngine::<f64>::new(2);
        assert!(eng.factor(&S).is_ok());
        assert!(eng.L.data.norm_inf_diff(&[2., 1., 0., 2.]) < 1e-14);
    }

    #[test]
    fn test_cholesky_indefinite() {
        let S = Matrix::from(&[[1., 2.], [2., 1.]]);
        let mut eng = CholeskyEngine::<f64>::new(2);
        assert_eq!(eng.factor(&S), Err(DenseFactorizationError::Cholesky));

        let S = Matrix::from(&[[1., 0.], [0., f64::NAN]]);
        assert_eq!(eng.factor(&S), Err(DenseFactorizationError::NonFinite));

        let S = Matrix::<f64>::identity(3);
        assert_eq!(
            eng.factor(&S),
            Err(DenseFactorizationError::IncompatibleDimension)
        );
    }
}
