#![allow(non_snake_case)]

use crate::algebra::{DenseFactorizationError, FactorEigen, FloatT, Matrix, ShapedMatrix};

pub struct EigEngine<T> {
    /// Computed eigenvalues in ascending order
    pub λ: Vec<T>,

    /// Computed eigenvectors (optional)
    pub V: Option<Matrix<T>>,
}

impl<T> EigEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let λ = vec![T::zero(); n];
        let V = None;
        Self { λ, V }
    }

    fn syev(&mut self, A: &mut Matrix<T>, want_vecs: bool) -> Result<(), DenseFactorizationError> {
        if !A.is_square() || A.nrows() != self.λ.len() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();

        // allocate for eigenvectors on first request
        if want_vecs && self.V.is_none() {
            self.V = Some(Matrix::<T>::zeros((n, n)));
        }
        let V = match self.V.as_mut() {
            Some(V) if want_vecs => Some(V.data_mut()),
            _ => None,
        };

        // we always assume triu form
        T::xsyev(n, &A.data, &mut self.λ, V)
    }
}

impl<T> FactorEigen for EigEngine<T>
where
    T: FloatT,
{
    type T = T;
    fn eigvals(&mut self, A: &mut Matrix<T>) -> Result<(), DenseFactorizationError> {
        self.syev(A, false)
    }
    fn eigen(&mut self, A: &mut Matrix<T>) -> Result<(), DenseFactorizationError> {
        self.syev(A, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{DenseMatrix, MatrixMath, MultiplyGEMM, VectorMath};

    #[test]
    fn test_eigen() {
        let mut S = Matrix::new_from_slice((3, 3), &[3., 2., 4., 2., 0., 2., 4., 2., 3.]);
        let Scopy = S.clone();

        let mut eng = EigEngine::<f64>::new(3);
        assert!(eng.eigvals(&mut S).is_ok());
        let sol = [-1.0, -1.0, 8.];
        assert!(eng.λ.norm_inf_diff(&sol) < 1e-6);

        let mut S = Scopy.clone();
        assert!(eng.eigen(&mut S).is_ok());
        let λ = &eng.λ;
        let V = eng.V.as_ref().unwrap();

        // V Λ V' = S
        let mut M = V.clone();
        M.rscale(λ);
        let mut C = Matrix::<f64>::zeros((3, 3));
        C.mul(&M, &V.t(), 1.0, 0.0);
        assert!(C.data().norm_inf_diff(Scopy.data()) < 1e-8);

        // V'V = I
        C.mul(&V.t(), V, 1.0, 0.0);
        assert!(C.data().norm_inf_diff(Matrix::<f64>::identity(3).data()) < 1e-10);
    }

    #[test]
    fn test_eigen_reads_upper_triangle() {
        // lower triangle is garbage and must be ignored
        #[rustfmt::skip]
        let mut S = Matrix::from(
            &[[2.0, 1.0, 0.0, 0.0],
              [9.0, 2.0, 0.0, 0.0],
              [9.0, 9.0, 5.0, 0.0],
              [9.0, 9.0, 9.0, -1.0]]);

        let mut eng = EigEngine::<f64>::new(4);
        assert!(eng.eigvals(&mut S).is_ok());
        assert!(eng.λ.norm_inf_diff(&[-1.0, 1.0, 3.0, 5.0]) < 1e-12);
    }

    #[test]
    fn test_eigen_empty_and_bad() {
        let mut eng = EigEngine::<f64>::new(0);
        let mut S = Matrix::<f64>::zeros((0, 0));
        assert!(eng.eigen(&mut S).is_ok());

        let mut eng = EigEngine::<f64>::new(2);
        let mut S = Matrix::from(&[[f64::NAN, 0.0], [0.0, 1.0]]);
        assert_eq!(eng.eigvals(&mut S), Err(DenseFactorizationError::NonFinite));

        let mut S = Matrix::<f64>::identity(3);
        assert_eq!(
            eng.eigvals(&mut S),
            Err(DenseFactorizationError::IncompatibleDimension)
        );
    }
}
