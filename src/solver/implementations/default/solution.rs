use super::*;
use crate::{algebra::*, solver::core::SolverStatus};

/// Solution returned by the [`DefaultSolver`]
#[derive(Debug)]
pub struct DefaultSolution<T> {
    /// primal solution
    pub x: Vec<T>,
    /// equality multipliers
    pub y: Vec<T>,
    /// dual slack (in the dual cone)
    pub z: Vec<T>,
    /// final solver status
    pub status: SolverStatus,
    /// primal objective value
    pub obj_val: T,
    /// dual objective value
    pub obj_val_dual: T,
    /// solve time in seconds
    pub solve_time: f64,
    /// number of iterations
    pub iterations: u32,
    /// primal residual
    pub r_prim: T,
    /// dual residual
    pub r_dual: T,
}

impl<T> DefaultSolution<T>
where
    T: FloatT,
{
    /// Create a new `DefaultSolution` object
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            y: vec![T::zero(); m],
            z: vec![T::zero(); n],
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            obj_val_dual: T::nan(),
            solve_time: 0f64,
            iterations: 0,
            r_prim: T::nan(),
            r_dual: T::nan(),
        }
    }

    pub(crate) fn finalize(&mut self, x: &[T], y: &[T], z: &[T], info: &DefaultInfo<T>) {
        self.x.copy_from(x);
        self.y.copy_from(y);
        self.z.copy_from(z);

        self.status = info.status;
        self.obj_val = info.cost_primal;
        self.obj_val_dual = info.cost_dual;
        self.iterations = info.iterations;
        self.r_prim = info.res_primal;
        self.r_dual = info.res_dual;
        self.solve_time = info.solve_time;
    }
}
