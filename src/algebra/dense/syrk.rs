#![allow(non_snake_case)]

use super::kernels::Operand;
use crate::algebra::{DenseMatrix, FloatT, Matrix, MultiplySYRK, ShapedMatrix};

impl<T> MultiplySYRK for Matrix<T>
where
    T: FloatT,
{
    type T = T;

    // implements self = C = αA*A' + βC
    //NB: unlike BLAS, both triangles of C are written
    fn syrk<MATA>(&mut self, A: &MATA, α: T, β: T) -> &Self
    where
        MATA: DenseMatrix<T = T>,
    {
        assert!(self.nrows() == A.nrows());
        assert!(self.ncols() == A.nrows());

        if self.nrows() == 0 {
            return self;
        }

        T::xsyrk(&Operand::of(A), α, β, &mut self.data);
        self
    }
}

#[test]
fn test_syrk() {
    let (m, n) = (2, 3);
    let A = Matrix::from(&[
        [1., 2., 3.], //
        [4., 5., 6.], //
    ]);

    let mut AAt = Matrix::<f64>::zeros((m, m));
    AAt.syrk(&A, 1.0, 0.0);

    let AAt_test = Matrix::from(&[
        [14., 32.], //
        [32., 77.], //
    ]);

    assert_eq!(AAt, AAt_test);

    //A'A, accumulated onto a symmetric C
    let mut AtA = Matrix::<f64>::zeros((n, n));
    AtA.data.fill(1.0);
    AtA.syrk(&A.t(), 2.0, 1.0);

    let AtA_test = Matrix::from(&[
        [35., 45., 55.], //
        [45., 59., 73.], //
        [55., 73., 91.], //
    ]);

    assert_eq!(AtA, AtA_test);
}
