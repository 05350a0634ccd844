use crate::algebra::*;
use crate::blocks::SupportedConeBlockT;
use crate::solver::core::SolverError;

// ---------------
// Data type for default problem format
// ---------------

/// Problem data for the standard form `min c'x` subject to `Ax = b`, `x ∈ K`
#[derive(Debug, Clone)]
pub struct DefaultProblemData<T> {
    // equality constraints and objective
    pub A: Matrix<T>,
    pub b: Vec<T>,
    pub c: Vec<T>,

    // constraint and variable counts
    pub m: usize,
    pub n: usize,

    // norms of the data vectors, for relative residuals
    pub normb: T,
    pub normc: T,
}

impl<T> DefaultProblemData<T>
where
    T: FloatT,
{
    pub fn new(
        A: &Matrix<T>,
        b: &[T],
        c: &[T],
        cones: &[SupportedConeBlockT],
    ) -> Result<Self, SolverError> {
        let (m, n) = A.size();

        if b.len() != m {
            return Err(SolverError::IncompatibleDimension("b"));
        }
        if c.len() != n {
            return Err(SolverError::IncompatibleDimension("c"));
        }
        if cones.iter().map(|t| t.nvars()).sum::<usize>() != n {
            return Err(SolverError::IncompatibleDimension("cones"));
        }
        if !A.data.is_finite() || !b.is_finite() || !c.is_finite() {
            return Err(SolverError::NonFiniteData);
        }

        Ok(Self {
            A: A.clone(),
            b: b.to_vec(),
            c: c.to_vec(),
            m,
            n,
            normb: b.norm_inf(),
            normc: c.norm_inf(),
        })
    }
}

#[test]
fn test_problemdata_dimensions() {
    use crate::blocks::SupportedConeBlockT::*;

    let A = Matrix::from(&[[1.0, 1.0, 0.0]]);
    let data = DefaultProblemData::new(&A, &[1.0], &[1.0, 2.0, 3.0], &[NonnegativeBlockT(3)]);
    assert!(data.is_ok());

    let data = DefaultProblemData::new(&A, &[1.0, 2.0], &[1.0, 2.0, 3.0], &[NonnegativeBlockT(3)]);
    assert_eq!(data.err(), Some(SolverError::IncompatibleDimension("b")));

    // a 2x2 semidefinite block takes 3 entries
    let data = DefaultProblemData::new(&A, &[1.0], &[1.0, 2.0, 3.0], &[SemidefiniteBlockT(3)]);
    assert_eq!(data.err(), Some(SolverError::IncompatibleDimension("cones")));
    let data = DefaultProblemData::new(&A, &[1.0], &[1.0, 2.0, 3.0], &[SemidefiniteBlockT(2)]);
    assert!(data.is_ok());

    let data = DefaultProblemData::new(&A, &[f64::NAN], &[1.0, 2.0, 3.0], &[NonnegativeBlockT(3)]);
    assert_eq!(data.err(), Some(SolverError::NonFiniteData));
}
