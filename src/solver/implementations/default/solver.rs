use super::*;
use crate::algebra::*;
use crate::blocks::{CompositeBlock, ConeBlockError, SupportedConeBlockT};
use crate::io::ConfigurablePrintTarget;
use crate::solver::core::{SolverError, SolverStatus};
use std::time::Instant;

/// Dense predictor-corrector solver for problems in the standard form
///
/// ```text
/// min  c'x
/// s.t. Ax = b,  x ∈ K
/// ```
///
/// where `K` is a product of the cone blocks given at construction.  The
/// Newton system is reduced to the Schur complement `A xiz⁻¹ A'`, which is
/// assembled block by block and factored with a dense Cholesky engine.

pub struct DefaultSolver<T: FloatT = f64> {
    pub data: DefaultProblemData<T>,
    pub blocks: CompositeBlock<T>,
    pub info: DefaultInfo<T>,
    pub solution: DefaultSolution<T>,
    pub settings: DefaultSettings<T>,

    // equality multipliers and their step
    y: Vec<T>,
    dy: Vec<T>,
}

// scratch space for one solve
struct Workspace<T> {
    x: Vec<T>,
    z: Vec<T>,
    rp: Vec<T>,
    rd: Vec<T>,
    r: Vec<T>,
    t: Vec<T>,
    schur: Matrix<T>,
    chol: CholeskyEngine<T>,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            z: vec![T::zero(); n],
            rp: vec![T::zero(); m],
            rd: vec![T::zero(); n],
            r: vec![T::zero(); n],
            t: vec![T::zero(); n],
            schur: Matrix::zeros((m, m)),
            chol: CholeskyEngine::new(m),
        }
    }
}

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    pub fn new(
        A: &Matrix<T>,
        b: &[T],
        c: &[T],
        cone_types: &[SupportedConeBlockT],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;

        let data = DefaultProblemData::<T>::new(A, b, c, cone_types)?;
        let blocks = CompositeBlock::<T>::new(cone_types);
        let info = DefaultInfo::<T>::new();

        // user facing results go here.
        let solution = DefaultSolution::<T>::new(data.n, data.m);

        let y = vec![T::zero(); data.m];
        let dy = vec![T::zero(); data.m];

        Ok(Self {
            data,
            blocks,
            info,
            solution,
            settings,
            y,
            dy,
        })
    }

    pub fn solve(&mut self) {
        let timer = Instant::now();

        // various initializations
        let mut iter: u32 = 0;
        let mut σ = T::one();
        let mut α = T::zero();

        self.info.reset();
        _check_print(
            self.info
                .print_configuration(&self.settings, &self.data, &self.blocks),
        );
        _check_print(self.info.print_status_header(&self.settings));

        // initialize variables to some reasonable starting point
        self.default_start();

        let mut work = Workspace::<T>::new(self.data.n, self.data.m);

        // ----------
        // main loop
        // ----------

        loop {
            //update the residuals
            //--------------
            self.update_residuals(&mut work);

            //calculate duality measure
            //--------------
            let μ = match self.blocks.get_mu_info() {
                Ok(muinfo) => muinfo.mu(),
                Err(e) => {
                    self.numerical_failure(e);
                    break;
                }
            };

            // record scalar values from most recent iteration.
            self.info.sigma = σ;
            self.info.step_length = α;
            self.info.iterations = iter;
            self.info.update(
                &self.data, &work.x, &self.y, &work.z, &work.rp, &work.rd, μ,
            );
            _check_print(self.info.print_status(&self.settings));

            let elapsed = timer.elapsed().as_secs_f64();
            if self.info.check_termination(&self.settings, elapsed) {
                break;
            }

            iter += 1;

            // compute the combined direction and its step length
            // --------------
            match self.compute_step(&mut work, μ) {
                Ok((s, a)) => {
                    σ = s;
                    α = a;
                }
                Err(e) => {
                    self.numerical_failure(e);
                    break;
                }
            }

            if α < self.settings.min_step_length {
                log::warn!("step length {:e} too small, stopping", α);
                self.info.status = SolverStatus::InsufficientProgress;
                break;
            }

            if let Err(e) = self.blocks.do_step(α) {
                self.numerical_failure(e);
                break;
            }
            self.y.axpby(α, &self.dy, T::one());
        } //end loop
        // ----------
        // ----------

        // the last step could have been rejected, so report
        // the iterate actually returned
        if self.info.status.is_errored() {
            self.info.iterations = iter;
            _check_print(self.info.print_status(&self.settings));
        }

        //store final solution, timing etc
        self.info.solve_time = timer.elapsed().as_secs_f64();
        self.blocks.get_vecx(&mut work.x);
        self.blocks.get_vecz(&mut work.z);
        self.solution
            .finalize(&work.x, &self.y, &work.z, &self.info);

        _check_print(self.info.print_footer(&self.settings));
    }

    // x = z = ρe and y = 0, with ρ scaled to the problem data
    fn default_start(&mut self) {
        let ρ = T::max(T::one(), T::max(self.data.normb, self.data.normc));
        self.blocks.clear();
        self.blocks.center_x(ρ, false);
        self.blocks.center_z(ρ, false);
        self.y.set(T::zero());
        self.dy.set(T::zero());
    }

    // rp = b - Ax and rd = c - A'y - z at the current iterate
    fn update_residuals(&self, work: &mut Workspace<T>) {
        let A = &self.data.A;
        self.blocks.get_vecx(&mut work.x);
        self.blocks.get_vecz(&mut work.z);

        work.rp.copy_from(&self.data.b);
        A.gemv(&mut work.rp, &work.x, -T::one(), T::one());

        work.rd.copy_from(&self.data.c);
        A.t().gemv(&mut work.rd, &self.y, -T::one(), T::one());
        work.rd.axpby(-T::one(), &work.z, T::one());
    }

    // Predictor and corrector solves.  Leaves the corrector direction in
    // the blocks and in dy, and returns the centering parameter together
    // with the step length to take.
    fn compute_step(&mut self, work: &mut Workspace<T>, μ: T) -> Result<(T, T), ConeBlockError> {
        // factor the Schur complement once, it only depends on the scaling
        work.schur.data_mut().set(T::zero());
        self.blocks
            .add_AxizinvAt(&self.data.A, &mut work.schur, false, false)?;
        work.chol.factor(&work.schur)?;

        // affine scaling (predictor) step
        // --------------
        self.solve_newton(work, T::zero(), T::zero())?;
        let mut α_aff = T::one();
        self.blocks.linesearch(&mut α_aff)?;
        let μ_aff = self.blocks.get_mu_info()?.mu_at(α_aff);

        let σ = {
            if μ > T::zero() {
                T::powi(T::min(T::one(), T::max(T::zero(), μ_aff / μ)), 3)
            } else {
                T::zero()
            }
        };

        // combined (corrector) step
        // --------------
        self.solve_newton(work, σ * μ, T::one())?;

        let mut α_max = T::infinity();
        self.blocks.linesearch(&mut α_max)?;
        let mut α = T::min(T::one(), self.settings.max_step_fraction * α_max);

        if self.settings.neighborhood_enable {
            let muinfo = self.blocks.get_mu_info()?;
            let nbh = self
                .blocks
                .get_nbh_info(&muinfo, self.settings.nbh_ubnd, &mut α)?;
            self.info.max_nbh = nbh.max_nbh;
        }

        Ok((σ, α))
    }

    // Solve for the step direction with complementarity target rhsmu
    // and second order correction weight rhscorr.
    //
    // With r = A'y - c + compl, eliminating dx = xiz⁻¹(A'dy + r) and
    // dz = rd - A'dy leaves (A xiz⁻¹ A') dy = rp - A xiz⁻¹ r.
    fn solve_newton(
        &mut self,
        work: &mut Workspace<T>,
        rhsmu: T,
        rhscorr: T,
    ) -> Result<(), ConeBlockError> {
        let A = &self.data.A;

        // r = -rd - z + compl
        work.r.scalarop_from(|v| -v, &work.rd);
        work.r.axpby(-T::one(), &work.z, T::one());
        self.blocks.add_muxinv(&mut work.r, rhsmu, rhscorr, false)?;

        // dy from the factored Schur complement
        work.t.copy_from(&work.r);
        self.blocks.apply_xizinv(&mut work.t, false)?;
        self.dy.copy_from(&work.rp);
        A.gemv(&mut self.dy, &work.t, -T::one(), T::one());

        let mut rhs = Matrix::new_from_slice((self.data.m, 1), &self.dy);
        work.chol.solve(&mut rhs);
        self.dy.copy_from(rhs.data());
        if !self.dy.is_finite() {
            return Err(ConeBlockError::NonFinite);
        }

        // back substitute for dx and dz
        A.t().gemv(&mut work.r, &self.dy, T::one(), T::one());
        self.blocks.set_dx_xizsolverhs(&work.r)?;

        Ok(())
    }

    fn numerical_failure(&mut self, e: ConeBlockError) {
        log::warn!("solver stopped on block failure (code {}): {}", e.code(), e);
        self.info.status = SolverStatus::NumericalError;
    }
}

fn _check_print(result: std::io::Result<()>) {
    if let Err(e) = result {
        log::warn!("failed to write solver output: {}", e);
    }
}

impl<T> ConfigurablePrintTarget for DefaultSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn std::io::Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn print_to_sink(&mut self) {
        self.info.print_to_sink()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}

#[test]
fn test_solver_new_checks() {
    use crate::blocks::NonnegativeBlockT;

    let A = Matrix::from(&[[1.0, 1.0]]);
    let mut settings = DefaultSettings::<f64>::default();
    settings.max_step_fraction = 0.0;
    let solver = DefaultSolver::new(&A, &[1.0], &[1.0, 2.0], &[NonnegativeBlockT(2)], settings);
    assert!(matches!(solver, Err(SolverError::BadSettings(_))));

    let settings = DefaultSettings::<f64>::default();
    let solver = DefaultSolver::new(&A, &[1.0], &[1.0, 2.0], &[NonnegativeBlockT(3)], settings);
    assert_eq!(solver.err(), Some(SolverError::IncompatibleDimension("cones")));
}
