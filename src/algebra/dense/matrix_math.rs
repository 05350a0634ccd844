#![allow(non_snake_case)]
use super::kernels::Operand;
use crate::algebra::{
    Adjoint, AsFloatT, FloatT, Matrix, MatrixMath, MatrixVectorMultiply, ShapedMatrix,
    VectorMath,
};

impl<T: FloatT> MatrixMath for Matrix<T> {
    type T = T;

    //scalar mut operations
    fn scale(&mut self, c: T) {
        self.data.scale(c);
    }

    fn rscale(&mut self, r: &[T]) {
        assert_eq!(r.len(), self.n);
        for (col, val) in r.iter().enumerate() {
            self.col_slice_mut(col).scale(*val);
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);
        for i in 0..self.m {
            for j in 0..self.n {
                self[(i, j)] *= l[i] * r[j];
            }
        }
    }

    fn symmetrize(&mut self) {
        assert!(self.is_square());
        let half: T = (0.5).as_T();
        for c in 0..self.n {
            for r in 0..c {
                let v = (self[(r, c)] + self[(c, r)]) * half;
                self[(r, c)] = v;
                self[(c, r)] = v;
            }
        }
    }

    fn dot_frobenius(&self, B: &Self) -> T {
        assert_eq!(self.size(), B.size());
        self.data.dot(&B.data)
    }
}

impl<T: FloatT> MatrixVectorMultiply for Matrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(self.n, x.len());
        assert_eq!(self.m, y.len());
        T::xgemv(&Operand::of(self), x, a, b, y);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, Matrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(self.src.m, x.len());
        assert_eq!(self.src.n, y.len());
        T::xgemv(&Operand::of(self), x, a, b, y);
    }
}

#[test]
fn test_matrix_math() {
    let mut A = Matrix::from(&[[1.0, 2.0], [4.0, 3.0]]);

    let mut y = [1.0, 1.0];
    A.gemv(&mut y, &[1.0, -1.0], 2.0, 1.0);
    assert_eq!(y, [-1.0, 3.0]);

    A.symmetrize();
    assert_eq!(A[(0, 1)], 3.0);
    assert_eq!(A[(1, 0)], 3.0);

    let B = Matrix::identity(2);
    assert_eq!(A.dot_frobenius(&B), 4.0);

    A.lrscale(&[1.0, 2.0], &[3.0, 1.0]);
    assert_eq!(A.data, vec![3.0, 18.0, 3.0, 6.0]);

    A.rscale(&[0.5, 2.0]);
    A.scale(-1.0);
    assert_eq!(A.data, vec![-1.5, -9.0, -6.0, -12.0]);
}

#[test]
fn test_adjoint_gemv() {
    let A = Matrix::from(&[[1.0, 2.0, 0.0], [4.0, 3.0, -1.0]]);
    let mut y = [1.0, 1.0, 1.0];
    A.t().gemv(&mut y, &[1.0, 1.0], 1.0, 0.0);
    assert_eq!(y, [5.0, 5.0, -1.0]);
    A.t().gemv(&mut y, &[1.0, 0.0], -1.0, 1.0);
    assert_eq!(y, [4.0, 3.0, -1.0]);
}
