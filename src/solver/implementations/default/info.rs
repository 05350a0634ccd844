use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::core::SolverStatus;

/// Progress and termination information for the [`DefaultSolver`]

#[derive(Default, Debug)]
pub struct DefaultInfo<T> {
    pub μ: T,
    pub sigma: T,
    pub step_length: T,
    pub iterations: u32,
    pub cost_primal: T,
    pub cost_dual: T,
    pub res_primal: T,
    pub res_dual: T,
    pub gap_abs: T,
    pub gap_rel: T,
    pub max_nbh: T,

    pub solve_time: f64,
    pub status: SolverStatus,

    // target stream for printing
    pub(crate) stream: PrintTarget,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;
        self.step_length = T::zero();
        self.sigma = T::zero();
        self.max_nbh = T::zero();
    }

    /// Update objectives, residuals and gaps at the current iterate.
    /// `rp = b - Ax` and `rd = c - A'y - z`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn update(
        &mut self,
        data: &DefaultProblemData<T>,
        x: &[T],
        y: &[T],
        z: &[T],
        rp: &[T],
        rd: &[T],
        μ: T,
    ) {
        self.cost_primal = data.c.dot(x);
        self.cost_dual = data.b.dot(y);
        self.μ = μ;

        self.gap_abs = x.dot(z);
        let scale = T::max(
            T::one(),
            T::min(T::abs(self.cost_primal), T::abs(self.cost_dual)),
        );
        self.gap_rel = self.gap_abs / scale;

        self.res_primal = rp.norm_inf() / (T::one() + data.normb);
        self.res_dual = rd.norm_inf() / (T::one() + data.normc);
    }

    /// Check for convergence.  Sets the status and returns true
    /// if the solver should stop.
    pub(crate) fn check_termination(&mut self, settings: &DefaultSettings<T>, elapsed: f64) -> bool {
        let feasible = self.res_primal <= settings.tol_feas && self.res_dual <= settings.tol_feas;
        let gap_ok = self.gap_abs <= settings.tol_gap_abs || self.gap_rel <= settings.tol_gap_rel;

        if feasible && gap_ok {
            self.status = SolverStatus::Solved;
        } else if self.iterations >= settings.max_iter {
            self.status = SolverStatus::MaxIterations;
        } else if elapsed > settings.time_limit {
            self.status = SolverStatus::MaxTime;
        }
        self.status != SolverStatus::Unsolved
    }
}

#[test]
fn test_info_termination() {
    let A = Matrix::from(&[[1.0, 1.0]]);
    let data = DefaultProblemData::new(
        &A,
        &[1.0],
        &[1.0, 2.0],
        &[crate::blocks::NonnegativeBlockT(2)],
    )
    .unwrap();
    let settings = DefaultSettings::<f64>::default();
    let mut info = DefaultInfo::<f64>::new();

    // an optimal pair: x = (1,0), y = 1, z = (0,1)
    let (x, y, z) = ([1.0, 0.0], [1.0], [0.0, 1.0]);
    info.update(&data, &x, &y, &z, &[0.0], &[0.0, 0.0], 0.0);
    assert_eq!(info.cost_primal, 1.0);
    assert_eq!(info.cost_dual, 1.0);
    assert!(info.check_termination(&settings, 0.0));
    assert_eq!(info.status, SolverStatus::Solved);

    // infeasible and out of iterations
    info.reset();
    info.update(&data, &x, &y, &z, &[1.0], &[0.0, 0.0], 0.0);
    assert!(!info.check_termination(&settings, 0.0));
    info.iterations = settings.max_iter;
    assert!(info.check_termination(&settings, 0.0));
    assert_eq!(info.status, SolverStatus::MaxIterations);
}
