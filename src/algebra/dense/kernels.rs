#![allow(non_snake_case)]

// Scalar level wrappers around the nalgebra dense routines.  Each
// kernel works on raw column major slices, so that the engines and
// products elsewhere in this module stay generic over FloatT while
// nalgebra only ever sees the concrete f32 / f64 types.

use crate::algebra::{DenseFactorizationError, DenseMatrix, MatrixShape, ShapedMatrix};
use nalgebra::{DMatrix, DVector, Scalar};

// iteration cap for the symmetric eigensolver
pub(crate) const EIGEN_MAX_ITER: usize = 1000;

/// Dense kernels available for the floating point type.  Sealed, and
/// implemented for f32 and f64 only.
pub trait DenseFloatT:
    private::DenseFloatSealed
    + XsyevScalar
    + XpotrfScalar
    + XtrsmScalar
    + XgemmScalar
    + XgemvScalar
    + XsyrkScalar
{
}

impl DenseFloatT for f32 {}
impl DenseFloatT for f64 {}

mod private {
    pub trait DenseFloatSealed {}
    impl DenseFloatSealed for f32 {}
    impl DenseFloatSealed for f64 {}
}

/// A column major operand `op(A)` of logical size `m × n`.  For the
/// transposed shape `data` holds the `n × m` source matrix.
pub struct Operand<'a, T> {
    pub data: &'a [T],
    pub m: usize,
    pub n: usize,
    pub shape: MatrixShape,
}

impl<'a, T> Operand<'a, T> {
    pub fn of<M>(A: &'a M) -> Self
    where
        M: DenseMatrix<T = T>,
    {
        Self {
            data: A.data(),
            m: A.nrows(),
            n: A.ncols(),
            shape: A.shape(),
        }
    }

    fn to_dmatrix(&self) -> DMatrix<T>
    where
        T: Scalar,
    {
        match self.shape {
            MatrixShape::N => DMatrix::from_column_slice(self.m, self.n, self.data),
            MatrixShape::T => DMatrix::from_column_slice(self.n, self.m, self.data).transpose(),
        }
    }
}

// --------------------------------------
// symmetric eigendecomposition
// --------------------------------------

pub trait XsyevScalar: Sized {
    // eigenvalues of the n × n matrix triu(a) in ascending order into w,
    // with matching eigenvectors as the columns of v if requested
    fn xsyev(
        n: usize,
        a: &[Self],
        w: &mut [Self],
        v: Option<&mut [Self]>,
    ) -> Result<(), DenseFactorizationError>;
}

// --------------------------------------
// Cholesky decomposition
// --------------------------------------

pub trait XpotrfScalar: Sized {
    // lower factor of triu(a) = LL' into l, with zeros above the diagonal
    fn xpotrf(n: usize, a: &[Self], l: &mut [Self]) -> Result<(), DenseFactorizationError>;
}

// --------------------------------------
// triangular solve, multiple right hand sides
// --------------------------------------

pub trait XtrsmScalar: Sized {
    // b = op(L) \ b for lower triangular L.  false if L is singular
    fn xtrsm(trans: MatrixShape, n: usize, l: &[Self], b: &mut [Self], nrhs: usize) -> bool;
}

// --------------------------------------
// matrix matrix multiply
// --------------------------------------

pub trait XgemmScalar: Sized {
    // c = α op(a) op(b) + β c
    fn xgemm(a: &Operand<'_, Self>, b: &Operand<'_, Self>, α: Self, β: Self, c: &mut [Self]);
}

// --------------------------------------
// matrix vector multiply
// --------------------------------------

pub trait XgemvScalar: Sized {
    // y = α op(a) x + β y
    fn xgemv(a: &Operand<'_, Self>, x: &[Self], α: Self, β: Self, y: &mut [Self]);
}

// --------------------------------------
// symmetric rank k update
// --------------------------------------

pub trait XsyrkScalar: Sized {
    // c = α op(a) op(a)' + β c, writing both triangles of c
    fn xsyrk(a: &Operand<'_, Self>, α: Self, β: Self, c: &mut [Self]);
}

macro_rules! impl_dense_kernels {
    ($T:ty) => {
        impl XsyevScalar for $T {
            fn xsyev(
                n: usize,
                a: &[Self],
                w: &mut [Self],
                v: Option<&mut [Self]>,
            ) -> Result<(), DenseFactorizationError> {
                if n == 0 {
                    return Ok(());
                }
                if !a.iter().all(|x| x.is_finite()) {
                    return Err(DenseFactorizationError::NonFinite);
                }
                let mut M = DMatrix::<$T>::from_column_slice(n, n, a);
                M.fill_lower_triangle_with_upper_triangle();

                let eig = M
                    .try_symmetric_eigen(<$T>::EPSILON, EIGEN_MAX_ITER)
                    .ok_or(DenseFactorizationError::Eigen(EIGEN_MAX_ITER))?;

                // nalgebra leaves the spectrum unordered
                let mut idx: Vec<usize> = (0..n).collect();
                idx.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

                for (k, &i) in idx.iter().enumerate() {
                    w[k] = eig.eigenvalues[i];
                }
                if let Some(v) = v {
                    for (k, &i) in idx.iter().enumerate() {
                        let col = eig.eigenvectors.column(i);
                        for (dst, src) in v[k * n..(k + 1) * n].iter_mut().zip(col.iter()) {
                            *dst = *src;
                        }
                    }
                }
                Ok(())
            }
        }

        impl XpotrfScalar for $T {
            fn xpotrf(
                n: usize,
                a: &[Self],
                l: &mut [Self],
            ) -> Result<(), DenseFactorizationError> {
                if n == 0 {
                    return Ok(());
                }
                if !a.iter().all(|x| x.is_finite()) {
                    return Err(DenseFactorizationError::NonFinite);
                }
                // nalgebra reads the lower triangle, we want triu
                let mut M = DMatrix::<$T>::from_column_slice(n, n, a);
                M.fill_lower_triangle_with_upper_triangle();

                let chol = M.cholesky().ok_or(DenseFactorizationError::Cholesky)?;
                l.copy_from_slice(chol.l().as_slice());
                Ok(())
            }
        }

        impl XtrsmScalar for $T {
            fn xtrsm(trans: MatrixShape, n: usize, l: &[Self], b: &mut [Self], nrhs: usize) -> bool {
                if n == 0 || nrhs == 0 {
                    return true;
                }
                let L = DMatrix::<$T>::from_column_slice(n, n, l);
                let mut B = DMatrix::<$T>::from_column_slice(n, nrhs, b);
                let ok = match trans {
                    MatrixShape::N => L.solve_lower_triangular_mut(&mut B),
                    MatrixShape::T => L.tr_solve_lower_triangular_mut(&mut B),
                };
                b.copy_from_slice(B.as_slice());
                ok
            }
        }

        impl XgemmScalar for $T {
            fn xgemm(a: &Operand<'_, Self>, b: &Operand<'_, Self>, α: Self, β: Self, c: &mut [Self]) {
                let (m, n) = (a.m, b.n);
                if m == 0 || n == 0 {
                    return;
                }
                // β == 0 means c is write only
                let mut C = if β == 0.0 {
                    DMatrix::<$T>::zeros(m, n)
                } else {
                    DMatrix::<$T>::from_column_slice(m, n, c)
                };
                C.gemm(α, &a.to_dmatrix(), &b.to_dmatrix(), β);
                c.copy_from_slice(C.as_slice());
            }
        }

        impl XgemvScalar for $T {
            fn xgemv(a: &Operand<'_, Self>, x: &[Self], α: Self, β: Self, y: &mut [Self]) {
                if y.is_empty() {
                    return;
                }
                let mut Y = if β == 0.0 {
                    DVector::<$T>::zeros(y.len())
                } else {
                    DVector::<$T>::from_column_slice(y)
                };
                if !x.is_empty() {
                    let X = DVector::<$T>::from_column_slice(x);
                    Y.gemv(α, &a.to_dmatrix(), &X, β);
                } else {
                    Y *= β;
                }
                y.copy_from_slice(Y.as_slice());
            }
        }

        impl XsyrkScalar for $T {
            fn xsyrk(a: &Operand<'_, Self>, α: Self, β: Self, c: &mut [Self]) {
                let n = a.m;
                if n == 0 {
                    return;
                }
                let A = a.to_dmatrix();
                let mut C = if β == 0.0 {
                    DMatrix::<$T>::zeros(n, n)
                } else {
                    DMatrix::<$T>::from_column_slice(n, n, c)
                };
                C.gemm(α, &A, &A.transpose(), β);
                // exact symmetry, as if only triu had been computed
                C.fill_lower_triangle_with_upper_triangle();
                c.copy_from_slice(C.as_slice());
            }
        }
    };
}

impl_dense_kernels!(f32);
impl_dense_kernels!(f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Matrix;

    #[test]
    fn test_operand_shapes() {
        let A = Matrix::from(&[[1., 2., 3.], [4., 5., 6.]]);
        let op = Operand::of(&A);
        assert_eq!((op.m, op.n, op.shape), (2, 3, MatrixShape::N));
        assert_eq!(op.to_dmatrix()[(1, 2)], 6.);

        let At = A.t();
        let op = Operand::of(&At);
        assert_eq!((op.m, op.n, op.shape), (3, 2, MatrixShape::T));
        assert_eq!(op.to_dmatrix()[(2, 1)], 6.);
    }

    #[test]
    fn test_xtrsm() {
        // L = [2 0; 1 1]
        let l = [2., 1., 0., 1.];
        let mut b = [2., 3.];
        assert!(f64::xtrsm(MatrixShape::N, 2, &l, &mut b, 1));
        assert_eq!(b, [1., 2.]);

        // L' = [2 1; 0 1]
        let mut b = [3., 1.];
        assert!(f64::xtrsm(MatrixShape::T, 2, &l, &mut b, 1));
        assert_eq!(b, [1., 1.]);

        let singular = [0., 1., 0., 1.];
        assert!(!f64::xtrsm(MatrixShape::N, 2, &singular, &mut b, 1));
    }
}
