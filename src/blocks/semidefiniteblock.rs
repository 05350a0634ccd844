use super::nbh_common::*;
use super::*;

// samples and bisection steps for the neighborhood cap
const NBH_SAMPLES: usize = 32;
const NBH_BISECTIONS: usize = 20;

// -------------------------------------
// Semidefinite Block
// -------------------------------------

// Nesterov-Todd scaling data.  With X = LL' and L'ZL = QDQ' we
// have W = RR' for R = LQD^{-1/4}, and W*Z*W = X.
struct NTScaling<T> {
    W: Matrix<T>,
    Winv: Matrix<T>,
    Xinv: Matrix<T>,
    // eigenvalues of L'ZL, i.e. of XZ
    D: Vec<T>,
}

struct PSDBlockData<T> {
    X: Matrix<T>,
    Z: Matrix<T>,
    dX: Option<Matrix<T>>,
    dZ: Option<Matrix<T>>,
    oldX: Matrix<T>,
    oldZ: Matrix<T>,
    compl_rhs: Option<Matrix<T>>,

    // caches, all cleared by point_changed
    scaling: Option<NTScaling<T>>,
    // W ⊗ₛ W and Winv ⊗ₛ Winv
    gram: Option<(Matrix<T>, Matrix<T>)>,
    // Weig and Wvec = V*sqrt(Weig), so that W = Wvec*Wvec'
    weig: Option<(Vec<T>, Matrix<T>)>,
    // eigendecompositions of X and Z
    xeig: Option<(Vec<T>, Matrix<T>)>,
    zeig: Option<(Vec<T>, Matrix<T>)>,

    chol: CholeskyEngine<T>,
    eig: EigEngine<T>,
    workmat1: Matrix<T>,
    workmat2: Matrix<T>,
    workvec: Vec<T>,
}

impl<T> PSDBlockData<T>
where
    T: FloatT,
{
    fn new(n: usize) -> Self {
        Self {
            X: Matrix::identity(n),
            Z: Matrix::identity(n),
            dX: None,
            dZ: None,
            oldX: Matrix::identity(n),
            oldZ: Matrix::identity(n),
            compl_rhs: None,
            scaling: None,
            gram: None,
            weig: None,
            xeig: None,
            zeig: None,
            chol: CholeskyEngine::new(n),
            eig: EigEngine::new(n),
            workmat1: Matrix::zeros((n, n)),
            workmat2: Matrix::zeros((n, n)),
            workvec: vec![T::zero(); triangular_number(n)],
        }
    }

    // eigenvalues of X(t)Z(t) along the step into eig.λ, or false once
    // X(t) has left the cone
    fn product_eigs_at(&mut self, t: T) -> Result<bool, ConeBlockError> {
        let n = self.X.nrows();
        let mut Xt = self.X.clone();
        let mut Zt = self.Z.clone();
        if let Some(dX) = &self.dX {
            Xt.data.axpby(t, &dX.data, T::one());
        }
        if let Some(dZ) = &self.dZ {
            Zt.data.axpby(t, &dZ.data, T::one());
        }
        match self.chol.factor(&Xt) {
            Ok(()) => {}
            Err(DenseFactorizationError::Cholesky) => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        let L = &self.chol.L;
        let mut M = Matrix::zeros((n, n));
        self.workmat1.mul(&Zt, L, T::one(), T::zero());
        M.mul(&L.t(), &self.workmat1, T::one(), T::zero());
        self.eig.eigvals(&mut M)?;
        Ok(true)
    }

    // smallest eigenvalue of X(t)Z(t) along the step, or -∞ once
    // X(t) has left the cone
    fn min_product_at(&mut self, t: T) -> Result<T, ConeBlockError> {
        if self.product_eigs_at(t)? {
            Ok(self.eig.λ.minimum())
        } else {
            Ok(-T::infinity())
        }
    }

    // number of eigenvalues of X(t)Z(t) strictly above `bound`
    fn count_inside_at(&mut self, t: T, bound: T) -> Result<usize, ConeBlockError> {
        if self.product_eigs_at(t)? {
            Ok(self.eig.λ.iter().filter(|&&λ| λ > bound).count())
        } else {
            Ok(0)
        }
    }
}

/// Block for the cone of positive semidefinite matrices of order
/// `rowdim`, held in svec form of length `rowdim(rowdim+1)/2`.
///
/// The scaling `xiz(M) = Winv*M*Winv` uses the Nesterov-Todd point `W`,
/// the unique positive definite matrix with `W*Z*W = X`.
pub struct SemidefiniteBlock<T> {
    rowdim: usize,
    vecdim: usize,
    mu: T,
    old_mu: T,
    last_rhs_mu: T,
    last_alpha: T,
    data: Box<PSDBlockData<T>>,
}

impl<T> SemidefiniteBlock<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            rowdim: n,
            vecdim: triangular_number(n),
            mu: T::zero(),
            old_mu: T::zero(),
            last_rhs_mu: T::zero(),
            last_alpha: T::zero(),
            data: Box::new(PSDBlockData::new(n)),
        }
    }

    /// Order of the matrix variable
    pub fn rowdim(&self) -> usize {
        self.rowdim
    }

    fn point_changed(&mut self) {
        let d = &mut *self.data;
        d.scaling = None;
        d.gram = None;
        d.weig = None;
        d.xeig = None;
        d.zeig = None;
        d.dX = None;
        d.dZ = None;
        d.compl_rhs = None;
    }

    /// Compute and cache the Nesterov-Todd scaling at the current point.
    /// Fails with `NotInterior` unless `X` and `Z` are positive definite.
    pub fn compute_NTscaling(&mut self) -> Result<(), ConeBlockError> {
        if self.data.scaling.is_some() {
            return Ok(());
        }
        let n = self.rowdim;
        let d = &mut *self.data;

        if !d.X.data.is_finite() || !d.Z.data.is_finite() {
            return Err(ConeBlockError::NonFinite);
        }

        // X = LL'
        match d.chol.factor(&d.X) {
            Ok(()) => {}
            Err(DenseFactorizationError::Cholesky) => {
                log::debug!("semidefinite block: X not positive definite");
                return Err(ConeBlockError::NotInterior);
            }
            Err(e) => return Err(e.into()),
        }
        let L = &d.chol.L;
        let mut Linv = Matrix::zeros((n, n));
        d.chol.inverse_factor(&mut Linv);

        // L'ZL = QDQ'
        let mut M = Matrix::zeros((n, n));
        d.workmat1.mul(&d.Z, L, T::one(), T::zero());
        M.mul(&L.t(), &d.workmat1, T::one(), T::zero());
        d.eig.eigen(&mut M)?;
        let D = d.eig.λ.clone();
        if D.minimum() <= T::zero() {
            log::debug!("semidefinite block: Z not positive definite");
            return Err(ConeBlockError::NotInterior);
        }
        let Q = d.eig.V.as_ref().ok_or(DenseFactorizationError::Eigen(0))?;

        let d14: Vec<T> = D.iter().map(|&v| T::sqrt(T::sqrt(v))).collect();
        let d14inv: Vec<T> = d14.iter().map(|&v| T::recip(v)).collect();

        // R = LQD^{-1/4}, W = RR'
        let mut R = Matrix::zeros((n, n));
        R.mul(L, Q, T::one(), T::zero());
        R.rscale(&d14inv);
        let mut W = Matrix::zeros((n, n));
        W.syrk(&R, T::one(), T::zero());

        // R^{-T} = L^{-T}QD^{1/4}, Winv = R^{-T}R^{-1}
        let mut Rit = Matrix::zeros((n, n));
        Rit.mul(&Linv.t(), Q, T::one(), T::zero());
        Rit.rscale(&d14);
        let mut Winv = Matrix::zeros((n, n));
        Winv.syrk(&Rit, T::one(), T::zero());

        // X^{-1} = L^{-T}L^{-1}
        let mut Xinv = Matrix::zeros((n, n));
        Xinv.syrk(&Linv.t(), T::one(), T::zero());

        d.scaling = Some(NTScaling {
            W,
            Winv,
            Xinv,
            D,
        });
        Ok(())
    }

    fn compute_gram(&mut self) -> Result<(), ConeBlockError> {
        if self.data.gram.is_some() {
            return Ok(());
        }
        self.compute_NTscaling()?;
        let nvec = self.vecdim;
        let d = &mut *self.data;
        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let mut G = Matrix::zeros((nvec, nvec));
        let mut Ginv = Matrix::zeros((nvec, nvec));
        skron(&mut G, &sc.W);
        skron(&mut Ginv, &sc.Winv);
        d.gram = Some((G, Ginv));
        Ok(())
    }

    fn compute_Weig_Wvec(&mut self) -> Result<(), ConeBlockError> {
        if self.data.weig.is_some() {
            return Ok(());
        }
        self.compute_NTscaling()?;
        let d = &mut *self.data;
        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let (Weig, mut Wvec) = eigen_of(&mut d.eig, &sc.W)?;
        let sqrtλ: Vec<T> = Weig.iter().map(|&v| T::sqrt(T::max(v, T::zero()))).collect();
        Wvec.rscale(&sqrtλ);
        d.weig = Some((Weig, Wvec));
        Ok(())
    }

    // out = svec(A*M*A) for M = smat(v)
    fn congruence_svec(&mut self, v: &mut [T], inverse: bool, minus: bool) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let d = &mut *self.data;
        let sign = if minus { -T::one() } else { T::one() };

        if let Some((G, Ginv)) = &d.gram {
            let K = if inverse { G } else { Ginv };
            d.workvec.copy_from(v);
            K.gemv(v, &d.workvec, sign, T::zero());
            return Ok(());
        }

        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let A = if inverse { &sc.W } else { &sc.Winv };
        svec_to_mat(&mut d.workmat1, v);
        d.workmat2.mul(A, &d.workmat1, T::one(), T::zero());
        d.workmat1.mul(&d.workmat2, A, sign, T::zero());
        mat_to_svec(v, &d.workmat1);
        Ok(())
    }

    /// Largest `α` with `X + α dX ⪰ 0`
    pub fn primal_step_bound(&mut self) -> Result<T, ConeBlockError> {
        let d = &mut *self.data;
        let dX = d.dX.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        if d.xeig.is_none() {
            d.xeig = Some(eigen_of(&mut d.eig, &d.X)?);
        }
        let (lam, P) = d.xeig.as_ref().ok_or(ConeBlockError::NotInterior)?;
        step_to_boundary(&mut d.eig, lam, P, dX)
    }

    /// Largest `α` with `Z + α dZ ⪰ 0`
    pub fn dual_step_bound(&mut self) -> Result<T, ConeBlockError> {
        let d = &mut *self.data;
        let dZ = d.dZ.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        if d.zeig.is_none() {
            d.zeig = Some(eigen_of(&mut d.eig, &d.Z)?);
        }
        let (lam, P) = d.zeig.as_ref().ok_or(ConeBlockError::NotInterior)?;
        step_to_boundary(&mut d.eig, lam, P, dZ)
    }

    /// The scaling matrix `W` at the current point
    pub fn get_W(&mut self) -> Result<&Matrix<T>, ConeBlockError> {
        self.compute_NTscaling()?;
        let sc = self.data.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;
        Ok(&sc.W)
    }

    /// Duality measure set by the last step
    pub fn get_mu(&self) -> T {
        self.mu
    }

    /// Duality measure before the last step
    pub fn get_old_mu(&self) -> T {
        self.old_mu
    }

    /// Length of the last step taken
    pub fn get_last_alpha(&self) -> T {
        self.last_alpha
    }

    /// Primal point before the last step
    pub fn get_oldX(&self) -> &Matrix<T> {
        &self.data.oldX
    }

    /// Dual point before the last step
    pub fn get_oldZ(&self) -> &Matrix<T> {
        &self.data.oldZ
    }

    fn set_matrix(&mut self, vec: &[T], startindex: usize, dual: bool) -> Result<T, ConeBlockError> {
        let v = &vec[startindex..startindex + self.vecdim];
        let d = &mut *self.data;
        let M = if dual { &mut d.Z } else { &mut d.X };
        svec_to_mat(M, v);
        let finite = M.data.is_finite();
        let mut work = M.clone();
        self.point_changed();
        if !finite {
            return Err(ConeBlockError::NonFinite);
        }
        self.data.eig.eigvals(&mut work)?;
        let (α, β) = margins(&self.data.eig.λ);
        Ok(interior_shift(α, β, self.rowdim))
    }
}

// eigendecomposition of a symmetric matrix, leaving A untouched
fn eigen_of<T: FloatT>(
    eng: &mut EigEngine<T>,
    A: &Matrix<T>,
) -> Result<(Vec<T>, Matrix<T>), ConeBlockError> {
    let mut work = A.clone();
    eng.eigen(&mut work)?;
    let V = eng.V.clone().ok_or(DenseFactorizationError::Eigen(0))?;
    Ok((eng.λ.clone(), V))
}

// For M = PΛP' ≻ 0, the largest α with M + α dM ⪰ 0 is -1/γ for
// γ = λmin(Λ^{-1/2} P'dMP Λ^{-1/2}) < 0, and unbounded otherwise
fn step_to_boundary<T: FloatT>(
    eng: &mut EigEngine<T>,
    lam: &[T],
    P: &Matrix<T>,
    dM: &Matrix<T>,
) -> Result<T, ConeBlockError> {
    let n = lam.len();
    if n == 0 {
        return Ok(T::infinity());
    }
    if lam.minimum() <= T::zero() {
        return Err(ConeBlockError::NotInterior);
    }
    let s: Vec<T> = lam.iter().map(|&v| T::recip(T::sqrt(v))).collect();
    let mut work = Matrix::zeros((n, n));
    let mut M = Matrix::zeros((n, n));
    work.mul(dM, P, T::one(), T::zero());
    M.mul(&P.t(), &work, T::one(), T::zero());
    M.lrscale(&s, &s);
    eng.eigvals(&mut M)?;
    let γ = eng.λ[0];
    if γ < T::zero() {
        Ok(-T::recip(γ))
    } else {
        Ok(T::infinity())
    }
}

// (AB + BA)/2 for symmetric A, B
fn sym_product<T: FloatT>(out: &mut Matrix<T>, A: &Matrix<T>, B: &Matrix<T>, α: T, β: T) {
    let half: T = (0.5).as_T();
    out.mul(A, B, half * α, β);
    out.mul(B, A, half * α, T::one());
}

impl<T> ConeBlock<T> for SemidefiniteBlock<T>
where
    T: FloatT,
{
    fn clear(&mut self, dim: usize) {
        *self = Self::new(dim);
    }

    fn get_vecdim(&self) -> usize {
        self.vecdim
    }

    fn center_x(&mut self, val: T, add: bool) {
        let X = &mut self.data.X;
        if add {
            X.shift_diag(val);
        } else {
            X.set_identity();
            X.scale(val);
        }
        self.point_changed();
    }

    fn center_z(&mut self, val: T, add: bool) {
        let Z = &mut self.data.Z;
        if add {
            Z.shift_diag(val);
        } else {
            Z.set_identity();
            Z.scale(val);
        }
        self.point_changed();
    }

    fn set_x(&mut self, vec: &[T], startindex: usize) -> Result<T, ConeBlockError> {
        self.set_matrix(vec, startindex, false)
    }

    fn set_z(&mut self, vec: &[T], startindex: usize) -> Result<T, ConeBlockError> {
        self.set_matrix(vec, startindex, true)
    }

    fn vecgetsax(&self, vec: &mut [T], startindex: usize, a: T, add: bool) {
        let mut x = vec![T::zero(); self.vecdim];
        mat_to_svec(&mut x, &self.data.X);
        let out = &mut vec[startindex..startindex + self.vecdim];
        if add {
            out.axpby(a, &x, T::one());
        } else {
            out.scalarop_from(|v| a * v, &x);
        }
    }

    fn vecgetsaz(&self, vec: &mut [T], startindex: usize, a: T, add: bool) {
        let mut z = vec![T::zero(); self.vecdim];
        mat_to_svec(&mut z, &self.data.Z);
        let out = &mut vec[startindex..startindex + self.vecdim];
        if add {
            out.axpby(a, &z, T::one());
        } else {
            out.scalarop_from(|v| a * v, &z);
        }
    }

    fn get_mu_info(&mut self, info: &mut MuInfo<T>) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let d = &*self.data;
        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;

        info.mudim += self.rowdim;
        info.tr_xz += d.X.dot_frobenius(&d.Z);
        if let (Some(dX), Some(dZ)) = (&d.dX, &d.dZ) {
            info.tr_xdzpdxz += d.X.dot_frobenius(dZ) + dX.dot_frobenius(&d.Z);
            info.tr_dxdz += dX.dot_frobenius(dZ);
        }
        info.min_xz = T::min(info.min_xz, sc.D.minimum());
        info.max_xz = T::max(info.max_xz, sc.D.maximum());
        Ok(())
    }

    fn get_nbh_info(
        &mut self,
        muinfo: &MuInfo<T>,
        nbh_ubnd: T,
        alpha: &mut T,
        info: &mut NbhInfo<T>,
    ) -> Result<(), ConeBlockError> {
        if muinfo.mudim == 0 || self.rowdim == 0 {
            return Ok(());
        }
        self.compute_NTscaling()?;

        let n = self.rowdim;
        let (c0, c1, c2) = muinfo.mu_coeffs();
        let γ = T::one() - nbh_ubnd;

        {
            let d = &*self.data;
            let zero = Matrix::zeros((n, n));
            let dX = d.dX.as_ref().unwrap_or(&zero);
            let dZ = d.dZ.as_ref().unwrap_or(&zero);

            let mut V0 = Matrix::zeros((n, n));
            let mut V1 = Matrix::zeros((n, n));
            let mut V2 = Matrix::zeros((n, n));
            sym_product(&mut V0, &d.X, &d.Z, T::one(), T::zero());
            sym_product(&mut V1, &d.X, dZ, T::one(), T::zero());
            sym_product(&mut V1, dX, &d.Z, T::one(), T::one());
            sym_product(&mut V2, dX, dZ, T::one(), T::zero());
            V0.shift_diag(-c0);
            V1.shift_diag(-c1);
            V2.shift_diag(-c2);

            info.nrmsqr_xz += V0.dot_frobenius(&V0);
            info.nrmsqr_xdzpdxz += V1.dot_frobenius(&V1);
            info.nrmsqr_dxdz += V2.dot_frobenius(&V2);
            info.ip_xz_xdzpdxz += V0.dot_frobenius(&V1);
            info.ip_xz_dxdz += V0.dot_frobenius(&V2);
            info.ip_dxdz_xdzpdxz += V2.dot_frobenius(&V1);
        }

        // Cap at the first point where an eigenvalue of XZ that was inside
        // the neighborhood leaves it.  Eigenvalues already outside do not
        // limit the step, and neither does one that only re-enters.
        let d = &mut *self.data;
        let count = |d: &mut PSDBlockData<T>, t: T| -> Result<usize, ConeBlockError> {
            d.count_inside_at(t, γ * muinfo.mu_at(t))
        };

        let amax = *alpha;
        if amax.is_finite() && amax > T::zero() {
            let nsamples: T = NBH_SAMPLES.as_T();
            let mut lo = T::zero();
            let mut inside = count(d, lo)?;
            let mut hi = None;
            for k in 1..=NBH_SAMPLES {
                if inside == 0 {
                    break;
                }
                let t = amax * k.as_T() / nsamples;
                let c = count(d, t)?;
                if c < inside {
                    hi = Some(t);
                    break;
                }
                lo = t;
                inside = c;
            }
            if let Some(mut hi) = hi {
                let half: T = (0.5).as_T();
                for _ in 0..NBH_BISECTIONS {
                    let mid = half * (lo + hi);
                    if count(d, mid)? < inside {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                *alpha = lo;
            }
        }

        let α = *alpha;
        let mu_α = muinfo.mu_at(α);
        if mu_α > T::zero() {
            let minp = d.min_product_at(α)?;
            info.max_nbh = T::max(info.max_nbh, T::one() - minp / mu_α);
        }
        Ok(())
    }

    fn linesearch(&mut self, alpha: &mut T) -> Result<(), ConeBlockError> {
        let αx = self.primal_step_bound()?;
        let αz = self.dual_step_bound()?;
        *alpha = T::min(*alpha, T::min(αx, αz));
        if *alpha <= T::zero() {
            log::debug!("semidefinite block: no positive step to the boundary");
            return Err(ConeBlockError::NoFeasibleStep);
        }
        Ok(())
    }

    fn add_muxinv(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        rhsmu: T,
        rhscorr: T,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let n = self.rowdim;
        let d = &mut *self.data;
        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;

        // rhsmu X^{-1} - rhscorr sym(X^{-1} dX dZ)
        let mut compl = sc.Xinv.clone();
        compl.scale(rhsmu);
        if rhscorr != T::zero() {
            let dX = d.dX.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
            let dZ = d.dZ.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
            let mut P = Matrix::zeros((n, n));
            d.workmat1.mul(&sc.Xinv, dX, T::one(), T::zero());
            P.mul(&d.workmat1, dZ, T::one(), T::zero());
            P.symmetrize();
            compl.data.axpby(-rhscorr, &P.data, T::one());
        }

        mat_to_svec(&mut d.workvec, &compl);
        let out = &mut rhs[startindex..startindex + self.vecdim];
        let sign = if minus { -T::one() } else { T::one() };
        out.axpby(sign, &d.workvec, T::one());

        self.last_rhs_mu = rhsmu;
        d.compl_rhs = Some(compl);
        Ok(())
    }

    fn set_dx(&mut self, rhs: &[T], startindex: usize) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let n = self.rowdim;
        let d = &mut *self.data;
        let compl = d
            .compl_rhs
            .as_ref()
            .ok_or(ConeBlockError::MissingComplementarityRhs)?;
        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;

        let mut dX = Matrix::zeros((n, n));
        svec_to_mat(&mut dX, &rhs[startindex..startindex + self.vecdim]);

        // dZ = -Winv dX Winv - Z + compl
        let mut dZ = compl.clone();
        dZ.data.axpby(-T::one(), &d.Z.data, T::one());
        d.workmat1.mul(&sc.Winv, &dX, T::one(), T::zero());
        dZ.mul(&d.workmat1, &sc.Winv, -T::one(), T::one());
        dZ.symmetrize();

        d.dX = Some(dX);
        d.dZ = Some(dZ);
        Ok(())
    }

    fn set_dx_xizsolverhs(&mut self, rhs: &[T], startindex: usize) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let n = self.rowdim;
        let d = &mut *self.data;
        let compl = d
            .compl_rhs
            .as_ref()
            .ok_or(ConeBlockError::MissingComplementarityRhs)?;
        let sc = d.scaling.as_ref().ok_or(ConeBlockError::NotInterior)?;

        let mut R = Matrix::zeros((n, n));
        svec_to_mat(&mut R, &rhs[startindex..startindex + self.vecdim]);

        // dX = W R W
        let mut dX = Matrix::zeros((n, n));
        d.workmat1.mul(&sc.W, &R, T::one(), T::zero());
        dX.mul(&d.workmat1, &sc.W, T::one(), T::zero());
        dX.symmetrize();

        // dZ = -R - Z + compl
        let mut dZ = compl.clone();
        dZ.data.axpby(-T::one(), &d.Z.data, T::one());
        dZ.data.axpby(-T::one(), &R.data, T::one());

        d.dX = Some(dX);
        d.dZ = Some(dZ);
        Ok(())
    }

    fn apply_xizinv(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        let v = &mut rhs[startindex..startindex + self.vecdim];
        self.congruence_svec(v, true, minus)
    }

    fn apply_xiz(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        let v = &mut rhs[startindex..startindex + self.vecdim];
        self.congruence_svec(v, false, minus)
    }

    fn do_step(&mut self, alpha: T) -> Result<(), ConeBlockError> {
        let d = &mut *self.data;
        let dX = d.dX.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        let dZ = d.dZ.as_ref().ok_or(ConeBlockError::StepUnavailable)?;

        d.oldX.data.copy_from(&d.X.data);
        d.oldZ.data.copy_from(&d.Z.data);
        d.X.data.axpby(alpha, &dX.data, T::one());
        d.Z.data.axpby(alpha, &dZ.data, T::one());

        self.last_alpha = alpha;
        self.old_mu = self.mu;
        self.mu = self.last_rhs_mu;
        self.point_changed();
        Ok(())
    }

    fn add_AxizinvAt(
        &mut self,
        A: &Matrix<T>,
        globalsys: &mut Matrix<T>,
        minus: bool,
        Atrans: bool,
    ) -> Result<(), ConeBlockError> {
        let (n, nvec) = (self.rowdim, self.vecdim);
        let m = if Atrans { A.ncols() } else { A.nrows() };
        assert_eq!(if Atrans { A.nrows() } else { A.ncols() }, nvec);
        assert_eq!(globalsys.size(), (m, m));

        self.compute_Weig_Wvec()?;
        let d = &mut *self.data;
        let (_, Wvec) = d.weig.as_ref().ok_or(ConeBlockError::NotInterior)?;

        // row k of B is svec(Wvec' A_k Wvec), so that B*B' = A*xiz⁻¹*A'
        let mut B = Matrix::zeros((m, nvec));
        let mut ak = vec![T::zero(); nvec];
        let mut Ak = Matrix::zeros((n, n));
        for k in 0..m {
            for (j, akj) in ak.iter_mut().enumerate() {
                *akj = if Atrans { A[(j, k)] } else { A[(k, j)] };
            }
            svec_to_mat(&mut Ak, &ak);
            d.workmat1.mul(&Ak, Wvec, T::one(), T::zero());
            d.workmat2.mul(&Wvec.t(), &d.workmat1, T::one(), T::zero());
            mat_to_svec(&mut ak, &d.workmat2);
            for (j, &akj) in ak.iter().enumerate() {
                B[(k, j)] = akj;
            }
        }

        let sign = if minus { -T::one() } else { T::one() };
        globalsys.syrk(&B, sign, T::one());
        Ok(())
    }

    fn add_xiz(
        &mut self,
        globalsys: &mut Matrix<T>,
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        let nvec = self.vecdim;
        assert!(globalsys.is_square());
        assert!(startindex + nvec <= globalsys.nrows());

        self.compute_gram()?;
        let (_, Ginv) = self.data.gram.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let sign = if minus { -T::one() } else { T::one() };
        for j in 0..nvec {
            for i in 0..nvec {
                globalsys[(startindex + i, startindex + j)] += sign * Ginv[(i, j)];
            }
        }
        Ok(())
    }

    fn get_vecx(&self, vec: &mut [T], startindex: usize) {
        mat_to_svec(&mut vec[startindex..startindex + self.vecdim], &self.data.X);
    }

    fn get_vecz(&self, vec: &mut [T], startindex: usize) {
        mat_to_svec(&mut vec[startindex..startindex + self.vecdim], &self.data.Z);
    }

    fn get_vecdx(&self, vec: &mut [T], startindex: usize) -> Result<(), ConeBlockError> {
        let dX = self.data.dX.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        mat_to_svec(&mut vec[startindex..startindex + self.vecdim], dX);
        Ok(())
    }

    fn get_vecdz(&self, vec: &mut [T], startindex: usize) -> Result<(), ConeBlockError> {
        let dZ = self.data.dZ.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        mat_to_svec(&mut vec[startindex..startindex + self.vecdim], dZ);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svec_of(M: &Matrix<f64>) -> Vec<f64> {
        let mut v = vec![0.0; triangular_number(M.nrows())];
        mat_to_svec(&mut v, M);
        v
    }

    fn test_block() -> SemidefiniteBlock<f64> {
        let X = Matrix::from(&[[2.0, 0.5, 0.0], [0.5, 1.0, 0.2], [0.0, 0.2, 1.5]]);
        let Z = Matrix::from(&[[1.0, -0.3, 0.1], [-0.3, 2.0, 0.0], [0.1, 0.0, 0.7]]);
        let mut blk = SemidefiniteBlock::<f64>::new(3);
        assert_eq!(blk.set_x(&svec_of(&X), 0).unwrap(), 0.0);
        assert_eq!(blk.set_z(&svec_of(&Z), 0).unwrap(), 0.0);
        blk
    }

    #[test]
    fn test_nt_scaling_diagonal() {
        let mut blk = SemidefiniteBlock::<f64>::new(2);
        blk.center_x(1.0, false);
        let Z = Matrix::from(&[[4.0, 0.0], [0.0, 1.0]]);
        blk.set_z(&svec_of(&Z), 0).unwrap();

        let W = blk.get_W().unwrap();
        let Wref = Matrix::from(&[[0.5, 0.0], [0.0, 1.0]]);
        assert!(W.data.norm_inf_diff(&Wref.data) < 1e-12);
    }

    #[test]
    fn test_nt_scaling_identity() {
        let mut blk = test_block();
        let W = blk.get_W().unwrap().clone();
        let X = blk.data.X.clone();
        let Z = blk.data.Z.clone();

        // W*Z*W = X
        let mut WZ = Matrix::<f64>::zeros((3, 3));
        let mut WZW = Matrix::<f64>::zeros((3, 3));
        WZ.mul(&W, &Z, 1.0, 0.0);
        WZW.mul(&WZ, &W, 1.0, 0.0);
        assert!(WZW.data.norm_inf_diff(&X.data) < 1e-10);

        // W ≻ 0
        let mut eng = EigEngine::<f64>::new(3);
        let mut Wc = W.clone();
        eng.eigvals(&mut Wc).unwrap();
        assert!(eng.λ.minimum() > 0.0);
    }

    #[test]
    fn test_apply_roundtrip() {
        let mut blk = test_block();
        let v0 = vec![1.0, -2.0, 0.5, 3.0, 0.25, -1.0];
        let mut v = v0.clone();
        blk.apply_xizinv(&mut v, 0, false).unwrap();
        blk.apply_xiz(&mut v, 0, false).unwrap();
        assert!(v.norm_inf_diff(&v0) < 1e-10);

        // the same once the Kronecker forms are built
        let mut S = Matrix::<f64>::zeros((6, 6));
        blk.add_xiz(&mut S, 0, false).unwrap();
        let mut w = v0.clone();
        blk.apply_xiz(&mut w, 0, true).unwrap();
        blk.apply_xizinv(&mut w, 0, true).unwrap();
        assert!(w.norm_inf_diff(&v0) < 1e-10);

        // add_xiz agrees with apply_xiz
        let mut y = vec![0.0; 6];
        S.gemv(&mut y, &v0, 1.0, 0.0);
        let mut yref = v0.clone();
        blk.apply_xiz(&mut yref, 0, false).unwrap();
        assert!(y.norm_inf_diff(&yref) < 1e-10);
    }

    #[test]
    fn test_schur_complement() {
        let mut blk = test_block();
        #[rustfmt::skip]
        let A = Matrix::from(
            &[[1.0, 0.0, 2.0, -1.0, 0.5, 0.0],
              [0.0, 1.0, 0.0,  0.0, 1.0, 3.0]]);

        let mut S = Matrix::<f64>::zeros((2, 2));
        blk.add_AxizinvAt(&A, &mut S, false, false).unwrap();

        // brute force A*xiz⁻¹*A'
        let mut Sref = Matrix::<f64>::zeros((2, 2));
        for k in 0..2 {
            let mut col: Vec<f64> = (0..6).map(|j| A[(k, j)]).collect();
            blk.apply_xizinv(&mut col, 0, false).unwrap();
            for l in 0..2 {
                let row: Vec<f64> = (0..6).map(|j| A[(l, j)]).collect();
                Sref[(l, k)] = row.dot(&col);
            }
        }
        assert!(S.data.norm_inf_diff(&Sref.data) < 1e-10);

        // transposed input, subtracted
        let At = Matrix::new_from_slice((6, 2), &{
            let mut v = vec![0.0; 12];
            for k in 0..2 {
                for j in 0..6 {
                    v[k * 6 + j] = A[(k, j)];
                }
            }
            v
        });
        blk.add_AxizinvAt(&At, &mut S, true, true).unwrap();
        assert!(S.data.norm_inf() < 1e-10);
    }

    #[test]
    fn test_linesearch_boundary() {
        let mut blk = SemidefiniteBlock::<f64>::new(2);
        let mut rhs = vec![0.0; 3];
        blk.add_muxinv(&mut rhs, 0, 1.0, 0.0, false).unwrap();

        // dX = -diag(2, 0.5) hits the boundary at α = 0.5
        let dX = Matrix::from(&[[-2.0, 0.0], [0.0, -0.5]]);
        blk.set_dx(&svec_of(&dX), 0).unwrap();
        assert!((blk.primal_step_bound().unwrap() - 0.5).abs() < 1e-12);

        // dZ = -dX - Z + I = dX negated, so the dual side is unbounded
        assert_eq!(blk.dual_step_bound().unwrap(), f64::INFINITY);

        let mut α = 1.0;
        blk.linesearch(&mut α).unwrap();
        assert!((α - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_set_x_correction() {
        let mut blk = SemidefiniteBlock::<f64>::new(2);
        let X = Matrix::from(&[[1.0, 2.0], [2.0, 1.0]]);
        // eigenvalues -1 and 3
        let shift = blk.set_x(&svec_of(&X), 0).unwrap();
        assert!((shift - 2.0).abs() < 1e-12);
        assert_eq!(blk.compute_NTscaling(), Err(ConeBlockError::NotInterior));

        blk.center_x(shift, true);
        assert!(blk.compute_NTscaling().is_ok());
    }

    #[test]
    fn test_step_and_mu_info() {
        let mut blk = test_block();
        let mut rhs = vec![0.0; 6];
        blk.add_muxinv(&mut rhs, 0, 0.1, 0.0, false).unwrap();
        blk.set_dx_xizsolverhs(&[0.1, 0.0, -0.1, 0.05, 0.0, 0.2], 0)
            .unwrap();

        let mut α = 1.0;
        blk.linesearch(&mut α).unwrap();
        α *= 0.9;

        let mut mu = MuInfo::new();
        blk.get_mu_info(&mut mu).unwrap();
        let predicted = mu.mu_at(α);

        blk.do_step(α).unwrap();
        assert_eq!(blk.get_last_alpha(), α);
        assert_eq!(blk.get_mu(), 0.1);

        let mut after = MuInfo::new();
        blk.get_mu_info(&mut after).unwrap();
        assert_eq!(after.mudim, 3);
        assert!((after.mu() - predicted).abs() < 1e-10);
        assert!(after.min_xz > 0.0 && after.min_xz <= after.max_xz);
    }

    #[test]
    fn test_nbh_cap_matches_diagonal_case() {
        // diagonal data behaves like a nonnegative block
        let D = Matrix::from(&[[1.0, 0.0], [0.0, 2.0]]);
        let mut blk = SemidefiniteBlock::<f64>::new(2);
        blk.set_x(&svec_of(&D), 0).unwrap();
        blk.set_z(&svec_of(&D), 0).unwrap();
        let mut rhs = vec![0.0; 3];
        blk.add_muxinv(&mut rhs, 0, 0.0, 0.0, false).unwrap();
        let dX = Matrix::from(&[[-0.5, 0.0], [0.0, 0.0]]);
        blk.set_dx(&svec_of(&dX), 0).unwrap();

        let mut nnc = NonnegativeBlock::<f64>::new(2);
        nnc.set_x(&[1.0, 2.0], 0).unwrap();
        nnc.set_z(&[1.0, 2.0], 0).unwrap();
        let mut rhs = vec![0.0; 2];
        nnc.add_muxinv(&mut rhs, 0, 0.0, 0.0, false).unwrap();
        nnc.set_dx(&[-0.5, 0.0], 0).unwrap();

        let mut α = 1.0;
        blk.linesearch(&mut α).unwrap();
        assert!((α - 1.0).abs() < 1e-12);

        let mut mu = MuInfo::new();
        blk.get_mu_info(&mut mu).unwrap();
        let mut nnc_mu = MuInfo::new();
        nnc.get_mu_info(&mut nnc_mu).unwrap();
        assert!((mu.mu() - nnc_mu.mu()).abs() < 1e-12);
        assert!((mu.tr_xdzpdxz - nnc_mu.tr_xdzpdxz).abs() < 1e-12);

        let mut nbh = NbhInfo::default();
        blk.get_nbh_info(&mu, 0.9, &mut α, &mut nbh).unwrap();
        let mut α_nnc = 1.0;
        let mut nbh_nnc = NbhInfo::default();
        nnc.get_nbh_info(&nnc_mu, 0.9, &mut α_nnc, &mut nbh_nnc).unwrap();

        assert!(α < 1.0);
        assert!((α - α_nnc).abs() < 1e-6);
        assert!((nbh.nrmsqr_xz - nbh_nnc.nrmsqr_xz).abs() < 1e-12);
        assert!((nbh.ip_xz_dxdz - nbh_nnc.ip_xz_dxdz).abs() < 1e-12);

        // the capped step stays inside
        let minp = blk.data.min_product_at(α).unwrap();
        assert!(minp >= 0.1 * mu.mu_at(α));
        assert!(nbh.max_nbh <= 0.9);
    }

    #[test]
    fn test_nbh_cap_with_entry_outside() {
        // the second product starts below (1 - 0.5) mu, the first barely
        // above it, so only the first one may cap the step
        let x = [0.933, 0.884, 0.826];
        let z = [0.235, 0.197, 1.090];
        let dx = [0.660, 0.500, -0.227];
        let diag = |v: &[f64]| {
            let mut M = Matrix::<f64>::zeros((3, 3));
            for (i, &vi) in v.iter().enumerate() {
                M[(i, i)] = vi;
            }
            M
        };

        let mut blk = SemidefiniteBlock::<f64>::new(3);
        blk.set_x(&svec_of(&diag(&x)), 0).unwrap();
        blk.set_z(&svec_of(&diag(&z)), 0).unwrap();
        let mut rhs = vec![0.0; 6];
        blk.add_muxinv(&mut rhs, 0, 0.0, 0.0, false).unwrap();
        blk.set_dx(&svec_of(&diag(&dx)), 0).unwrap();

        let mut nnc = NonnegativeBlock::<f64>::new(3);
        nnc.set_x(&x, 0).unwrap();
        nnc.set_z(&z, 0).unwrap();
        let mut rhs = vec![0.0; 3];
        nnc.add_muxinv(&mut rhs, 0, 0.0, 0.0, false).unwrap();
        nnc.set_dx(&dx, 0).unwrap();

        let mut α = 1.0;
        blk.linesearch(&mut α).unwrap();
        let mut α_nnc = 1.0;
        nnc.linesearch(&mut α_nnc).unwrap();
        assert!((α - α_nnc).abs() < 1e-12);
        assert!((α - 0.5857).abs() < 1e-3);

        let mut mu = MuInfo::new();
        blk.get_mu_info(&mut mu).unwrap();
        let mut nnc_mu = MuInfo::new();
        nnc.get_mu_info(&mut nnc_mu).unwrap();
        assert!(mu.min_xz < 0.5 * mu.mu());

        let mut nbh = NbhInfo::default();
        blk.get_nbh_info(&mu, 0.5, &mut α, &mut nbh).unwrap();
        let mut nbh_nnc = NbhInfo::default();
        nnc.get_nbh_info(&nnc_mu, 0.5, &mut α_nnc, &mut nbh_nnc).unwrap();

        assert!((α_nnc - 0.1193).abs() < 1e-3);
        assert!((α - α_nnc).abs() < 1e-6);
        assert!((nbh.max_nbh - nbh_nnc.max_nbh).abs() < 1e-6);
    }
}
