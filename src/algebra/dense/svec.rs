#![allow(non_snake_case)]
use crate::algebra::{triangular_number, FloatT, Matrix, ShapedMatrix};

// Symmetric matrices are vectorized by stacking the upper triangle
// column by column, with off-diagonal terms scaled by √2.  The packed
// inner product then agrees with the Frobenius inner product.

/// Unpack a scaled triangle into a full symmetric matrix
pub fn svec_to_mat<T: FloatT>(M: &mut Matrix<T>, x: &[T]) {
    let n = M.nrows();
    assert!(M.is_square());
    assert_eq!(x.len(), triangular_number(n));

    let isqrt2 = T::FRAC_1_SQRT_2();
    let mut idx = 0;
    for col in 0..n {
        for row in 0..=col {
            if row == col {
                M[(row, col)] = x[idx];
            } else {
                let v = x[idx] * isqrt2;
                M[(row, col)] = v;
                M[(col, row)] = v;
            }
            idx += 1;
        }
    }
}

/// Pack the upper triangle of a symmetric matrix with √2 scaling
pub fn mat_to_svec<T: FloatT>(x: &mut [T], M: &Matrix<T>) {
    let n = M.nrows();
    assert!(M.is_square());
    assert_eq!(x.len(), triangular_number(n));

    let sqrt2 = T::SQRT_2();
    let mut idx = 0;
    for col in 0..n {
        for row in 0..=col {
            x[idx] = if row == col {
                M[(row, col)]
            } else {
                M[(row, col)] * sqrt2
            };
            idx += 1;
        }
    }
}

/// Packed index of the entry `(i,j)` of a symmetric matrix
#[inline]
pub fn svec_index(i: usize, j: usize) -> usize {
    let (r, c) = if i <= j { (i, j) } else { (j, i) };
    triangular_number(c) + r
}

// produce the Symmetric Kronecker product of a symmetric matrix A
// with itself, i.e. A ⊗ₛ A.  This is the matrix of the operator
// svec(M) ↦ svec(A*M*A).  Both triangles of `out` are written.
pub fn skron<T>(out: &mut Matrix<T>, A: &Matrix<T>)
where
    T: FloatT,
{
    let sqrt2 = T::SQRT_2();
    let n = A.nrows();
    let nvec = triangular_number(n);
    assert!(A.is_square());
    assert!(out.size() == (nvec, nvec));

    let mut col = 0;
    for l in 0..n {
        for k in 0..=l {
            let mut row = 0;
            let kl_eq = k == l;

            for j in 0..n {
                let Ajl = A[(j, l)];
                let Ajk = A[(j, k)];

                for i in 0..=j {
                    if row > col {
                        break;
                    }

                    let ij_eq = i == j;

                    let v = {
                        match (ij_eq, kl_eq) {
                            (false, false) => A[(i, k)] * Ajl + A[(i, l)] * Ajk,
                            (true, false) => sqrt2 * Ajl * Ajk,
                            (false, true) => sqrt2 * A[(i, l)] * Ajk,
                            (true, true) => Ajl * Ajl,
                        }
                    };
                    out[(row, col)] = v;
                    out[(col, row)] = v;

                    row += 1;
                } //end i
            } //end j
            col += 1;
        } //end k
    } //end l
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{MatrixVectorMultiply, MultiplyGEMM, VectorMath};

    #[test]
    fn test_svec_roundtrip_and_inner_product() {
        let X = Matrix::from(&[[2.0, 1.0, -1.0], [1.0, 3.0, 0.5], [-1.0, 0.5, 4.0]]);
        let Y = Matrix::from(&[[1.0, -2.0, 0.0], [-2.0, 1.0, 1.0], [0.0, 1.0, 2.0]]);
        let mut x = vec![0.0; 6];
        let mut y = vec![0.0; 6];
        mat_to_svec(&mut x, &X);
        mat_to_svec(&mut y, &Y);

        // packed layout is triu by column
        assert_eq!(x[svec_index(0, 0)], 2.0);
        assert_eq!(x[svec_index(1, 1)], 3.0);
        assert!((x[svec_index(2, 1)] - 0.5 * f64::sqrt(2.0)).abs() < 1e-15);

        // packed inner product is the Frobenius one
        let frob: f64 = X.data.dot(&Y.data);
        assert!((x.dot(&y) - frob).abs() < 1e-12);

        let mut Z = Matrix::<f64>::zeros((3, 3));
        svec_to_mat(&mut Z, &x);
        assert!(Z.data.norm_inf_diff(&X.data) < 1e-15);
    }

    #[test]
    fn test_skron_is_congruence() {
        let A = Matrix::from(&[[2.0, 1.0, 0.0], [1.0, 3.0, -1.0], [0.0, -1.0, 1.5]]);
        let M = Matrix::from(&[[1.0, 0.5, 2.0], [0.5, -1.0, 0.0], [2.0, 0.0, 3.0]]);

        let mut K = Matrix::<f64>::zeros((6, 6));
        skron(&mut K, &A);

        // symmetric since A is
        for i in 0..6 {
            for j in 0..6 {
                assert!((K[(i, j)] - K[(j, i)]).abs() < 1e-14);
            }
        }

        let mut m = vec![0.0; 6];
        mat_to_svec(&mut m, &M);
        let mut y = vec![0.0; 6];
        K.gemv(&mut y, &m, 1.0, 0.0);

        let mut AM = Matrix::<f64>::zeros((3, 3));
        let mut AMA = Matrix::<f64>::zeros((3, 3));
        AM.mul(&A, &M, 1.0, 0.0);
        AMA.mul(&AM, &A, 1.0, 0.0);
        let mut yref = vec![0.0; 6];
        mat_to_svec(&mut yref, &AMA);

        assert!(y.norm_inf_diff(&yref) < 1e-12);
    }
}
