use super::nbh_common::*;
use super::*;
use crate::algebra::*;
use itertools::izip;
use std::iter::zip;

// -------------------------------------
// Nonnegative Block
// -------------------------------------

/// Block for the nonnegative orthant `{x : x ≥ 0}`.
///
/// The scaling is the elementwise ratio `xiz = z ⊘ x`, so that every
/// operation is diagonal and costs O(n).
pub struct NonnegativeBlock<T> {
    vecdim: usize,
    x: Vec<T>,
    z: Vec<T>,
    dx: Option<Vec<T>>,
    dz: Option<Vec<T>>,

    // z ⊘ x, valid only while x and z are unchanged
    xiz: Option<Vec<T>>,
    // complementarity rhs from the last add_muxinv
    compl_rhs: Option<Vec<T>>,

    mu: T,
    old_mu: T,
    last_rhs_mu: T,
    last_alpha: T,
    oldx: Vec<T>,
    oldz: Vec<T>,
}

impl<T> NonnegativeBlock<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            vecdim: dim,
            x: vec![T::one(); dim],
            z: vec![T::one(); dim],
            dx: None,
            dz: None,
            xiz: None,
            compl_rhs: None,
            mu: T::zero(),
            old_mu: T::zero(),
            last_rhs_mu: T::zero(),
            last_alpha: T::zero(),
            oldx: vec![T::one(); dim],
            oldz: vec![T::one(); dim],
        }
    }

    fn point_changed(&mut self) {
        self.xiz = None;
        self.dx = None;
        self.dz = None;
        self.compl_rhs = None;
    }

    /// Compute and cache `xiz = z ⊘ x`.  Fails unless `x` and `z` are
    /// strictly positive.
    pub fn compute_NTscaling(&mut self) -> Result<(), ConeBlockError> {
        if self.xiz.is_some() {
            return Ok(());
        }
        if !self.x.is_finite() || !self.z.is_finite() {
            return Err(ConeBlockError::NonFinite);
        }
        if self.x.minimum() <= T::zero() || self.z.minimum() <= T::zero() {
            log::debug!("nonnegative block: point not strictly positive");
            return Err(ConeBlockError::NotInterior);
        }
        let mut xiz = self.z.clone();
        zip(&mut xiz, &self.x).for_each(|(w, &x)| *w /= x);
        self.xiz = Some(xiz);
        Ok(())
    }

    /// Largest `α` with `x + α dx ≥ 0`
    pub fn primal_step_bound(&self) -> Result<T, ConeBlockError> {
        let dx = self.dx.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        Ok(zip(&self.x, dx).fold(T::infinity(), |α, (&x, &dx)| ratio_step(x, dx, α)))
    }

    /// Largest `α` with `z + α dz ≥ 0`
    pub fn dual_step_bound(&self) -> Result<T, ConeBlockError> {
        let dz = self.dz.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        Ok(zip(&self.z, dz).fold(T::infinity(), |α, (&z, &dz)| ratio_step(z, dz, α)))
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

    /// Point before the last step
    pub fn get_oldx(&self) -> &[T] {
        &self.oldx
    }

    /// Dual point before the last step
    pub fn get_oldz(&self) -> &[T] {
        &self.oldz
    }
}

impl<T> ConeBlock<T> for NonnegativeBlock<T>
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
        if add {
            self.x.translate(val);
        } else {
            self.x.set(val);
        }
        self.point_changed();
    }

    fn center_z(&mut self, val: T, add: bool) {
        if add {
            self.z.translate(val);
        } else {
            self.z.set(val);
        }
        self.point_changed();
    }

    fn set_x(&mut self, vec: &[T], startindex: usize) -> Result<T, ConeBlockError> {
        let n = self.vecdim;
        self.x.copy_from(&vec[startindex..startindex + n]);
        self.point_changed();
        if !self.x.is_finite() {
            return Err(ConeBlockError::NonFinite);
        }
        let (α, β) = margins(&self.x);
        Ok(interior_shift(α, β, n))
    }

    fn set_z(&mut self, vec: &[T], startindex: usize) -> Result<T, ConeBlockError> {
        let n = self.vecdim;
        self.z.copy_from(&vec[startindex..startindex + n]);
        self.point_changed();
        if !self.z.is_finite() {
            return Err(ConeBlockError::NonFinite);
        }
        let (α, β) = margins(&self.z);
        Ok(interior_shift(α, β, n))
    }

    fn vecgetsax(&self, vec: &mut [T], startindex: usize, a: T, add: bool) {
        let out = &mut vec[startindex..startindex + self.vecdim];
        if add {
            out.axpby(a, &self.x, T::one());
        } else {
            out.scalarop_from(|x| a * x, &self.x);
        }
    }

    fn vecgetsaz(&self, vec: &mut [T], startindex: usize, a: T, add: bool) {
        let out = &mut vec[startindex..startindex + self.vecdim];
        if add {
            out.axpby(a, &self.z, T::one());
        } else {
            out.scalarop_from(|z| a * z, &self.z);
        }
    }

    fn get_mu_info(&mut self, info: &mut MuInfo<T>) -> Result<(), ConeBlockError> {
        info.mudim += self.vecdim;
        info.tr_xz += self.x.dot(&self.z);
        if let (Some(dx), Some(dz)) = (&self.dx, &self.dz) {
            info.tr_xdzpdxz += self.x.dot(dz) + dx.dot(&self.z);
            info.tr_dxdz += dx.dot(dz);
        }
        for (&x, &z) in zip(&self.x, &self.z) {
            let xz = x * z;
            info.min_xz = T::min(info.min_xz, xz);
            info.max_xz = T::max(info.max_xz, xz);
        }
        Ok(())
    }

    fn get_nbh_info(
        &mut self,
        muinfo: &MuInfo<T>,
        nbh_ubnd: T,
        alpha: &mut T,
        info: &mut NbhInfo<T>,
    ) -> Result<(), ConeBlockError> {
        if muinfo.mudim == 0 || self.vecdim == 0 {
            return Ok(());
        }
        let (c0, c1, c2) = muinfo.mu_coeffs();
        let γ = T::one() - nbh_ubnd;

        // a missing step direction counts as zero
        let zeros = vec![T::zero(); self.vecdim];
        let dx = self.dx.as_deref().unwrap_or(&zeros);
        let dz = self.dz.as_deref().unwrap_or(&zeros);

        for (&x, &z, &dx, &dz) in izip!(&self.x, &self.z, dx, dz) {
            let p0 = x * z;
            let p1 = x * dz + dx * z;
            let p2 = dx * dz;

            let (v0, v1, v2) = (p0 - c0, p1 - c1, p2 - c2);
            info.nrmsqr_xz += v0 * v0;
            info.nrmsqr_xdzpdxz += v1 * v1;
            info.nrmsqr_dxdz += v2 * v2;
            info.ip_xz_xdzpdxz += v0 * v1;
            info.ip_xz_dxdz += v0 * v2;
            info.ip_dxdz_xdzpdxz += v2 * v1;

            // entries already outside the neighborhood do not limit the step
            let g0 = p0 - γ * c0;
            if g0 > T::zero() {
                *alpha = quadratic_first_root(g0, p1 - γ * c1, p2 - γ * c2, *alpha);
            }
        }

        let α = *alpha;
        let mu_α = muinfo.mu_at(α);
        if mu_α > T::zero() {
            let minp = izip!(&self.x, &self.z, dx, dz).fold(T::infinity(), |m, (&x, &z, &dx, &dz)| {
                T::min(m, (x + α * dx) * (z + α * dz))
            });
            info.max_nbh = T::max(info.max_nbh, T::one() - minp / mu_α);
        }
        Ok(())
    }

    fn linesearch(&mut self, alpha: &mut T) -> Result<(), ConeBlockError> {
        let αx = self.primal_step_bound()?;
        let αz = self.dual_step_bound()?;
        *alpha = T::min(*alpha, T::min(αx, αz));
        if *alpha <= T::zero() {
            log::debug!("nonnegative block: no positive step to the boundary");
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

        let mut compl: Vec<T> = self.x.iter().map(|&x| rhsmu / x).collect();
        if rhscorr != T::zero() {
            let dx = self.dx.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
            let dz = self.dz.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
            for (c, &x, &dx, &dz) in izip!(&mut compl, &self.x, dx, dz) {
                *c -= rhscorr * dx * dz / x;
            }
        }

        let out = &mut rhs[startindex..startindex + self.vecdim];
        let sign = if minus { -T::one() } else { T::one() };
        out.axpby(sign, &compl, T::one());

        self.last_rhs_mu = rhsmu;
        self.compl_rhs = Some(compl);
        Ok(())
    }

    fn set_dx(&mut self, rhs: &[T], startindex: usize) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let compl = self
            .compl_rhs
            .as_ref()
            .ok_or(ConeBlockError::MissingComplementarityRhs)?;
        let xiz = self.xiz.as_ref().ok_or(ConeBlockError::NotInterior)?;

        let dx = rhs[startindex..startindex + self.vecdim].to_vec();
        let dz = izip!(xiz, &dx, &self.z, compl)
            .map(|(&w, &dx, &z, &c)| -w * dx - z + c)
            .collect();

        self.dx = Some(dx);
        self.dz = Some(dz);
        Ok(())
    }

    fn set_dx_xizsolverhs(&mut self, rhs: &[T], startindex: usize) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let compl = self
            .compl_rhs
            .as_ref()
            .ok_or(ConeBlockError::MissingComplementarityRhs)?;
        let xiz = self.xiz.as_ref().ok_or(ConeBlockError::NotInterior)?;

        let r = &rhs[startindex..startindex + self.vecdim];
        let dx = zip(r, xiz).map(|(&r, &w)| r / w).collect();
        let dz = izip!(r, &self.z, compl)
            .map(|(&r, &z, &c)| -r - z + c)
            .collect();

        self.dx = Some(dx);
        self.dz = Some(dz);
        Ok(())
    }

    fn apply_xizinv(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let xiz = self.xiz.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let sign = if minus { -T::one() } else { T::one() };
        let out = &mut rhs[startindex..startindex + self.vecdim];
        zip(out, xiz).for_each(|(r, &w)| *r = sign * *r / w);
        Ok(())
    }

    fn apply_xiz(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError> {
        self.compute_NTscaling()?;
        let xiz = self.xiz.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let sign = if minus { -T::one() } else { T::one() };
        let out = &mut rhs[startindex..startindex + self.vecdim];
        zip(out, xiz).for_each(|(r, &w)| *r = sign * *r * w);
        Ok(())
    }

    fn do_step(&mut self, alpha: T) -> Result<(), ConeBlockError> {
        let dx = self.dx.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        let dz = self.dz.as_ref().ok_or(ConeBlockError::StepUnavailable)?;

        self.oldx.copy_from(&self.x);
        self.oldz.copy_from(&self.z);
        self.x.axpby(alpha, dx, T::one());
        self.z.axpby(alpha, dz, T::one());

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
        let n = self.vecdim;
        let m = if Atrans { A.ncols() } else { A.nrows() };
        assert_eq!(if Atrans { A.nrows() } else { A.ncols() }, n);
        assert_eq!(globalsys.size(), (m, m));

        self.compute_NTscaling()?;
        let xiz = self.xiz.as_ref().ok_or(ConeBlockError::NotInterior)?;

        // B = A*Diagonal(sqrt(x ⊘ z)), then S ± B*B'
        let mut B = Matrix::<T>::zeros((m, n));
        for (j, &w) in xiz.iter().enumerate() {
            let s = T::sqrt(T::recip(w));
            for i in 0..m {
                let Aij = if Atrans { A[(j, i)] } else { A[(i, j)] };
                B[(i, j)] = Aij * s;
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
        assert!(globalsys.is_square());
        assert!(startindex + self.vecdim <= globalsys.nrows());

        self.compute_NTscaling()?;
        let xiz = self.xiz.as_ref().ok_or(ConeBlockError::NotInterior)?;
        let sign = if minus { -T::one() } else { T::one() };
        for (i, &w) in xiz.iter().enumerate() {
            let k = startindex + i;
            globalsys[(k, k)] += sign * w;
        }
        Ok(())
    }

    fn get_vecx(&self, vec: &mut [T], startindex: usize) {
        vec[startindex..startindex + self.vecdim].copy_from(&self.x);
    }

    fn get_vecz(&self, vec: &mut [T], startindex: usize) {
        vec[startindex..startindex + self.vecdim].copy_from(&self.z);
    }

    fn get_vecdx(&self, vec: &mut [T], startindex: usize) -> Result<(), ConeBlockError> {
        let dx = self.dx.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        vec[startindex..startindex + self.vecdim].copy_from(dx);
        Ok(())
    }

    fn get_vecdz(&self, vec: &mut [T], startindex: usize) -> Result<(), ConeBlockError> {
        let dz = self.dz.as_ref().ok_or(ConeBlockError::StepUnavailable)?;
        vec[startindex..startindex + self.vecdim].copy_from(dz);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_with_step() -> NonnegativeBlock<f64> {
        let mut blk = NonnegativeBlock::<f64>::new(3);
        blk.center_x(1.0, false);
        blk.center_z(2.0, false);

        let mut rhs = vec![0.0; 3];
        blk.add_muxinv(&mut rhs, 0, 1.0, 0.0, false).unwrap();
        blk.set_dx(&[-0.5, 0.0, 0.3], 0).unwrap();
        blk
    }

    #[test]
    fn test_set_dx_completes_dual_step() {
        let blk = block_with_step();
        let mut dz = vec![0.0; 3];
        blk.get_vecdz(&mut dz, 0).unwrap();
        assert!(dz.norm_inf_diff(&[0.0, -1.0, -1.6]) < 1e-14);
    }

    #[test]
    fn test_step_bounds() {
        let mut blk = block_with_step();
        assert_eq!(blk.primal_step_bound().unwrap(), 2.0);
        assert_eq!(blk.dual_step_bound().unwrap(), 1.25);

        let mut α = 10.0;
        blk.linesearch(&mut α).unwrap();
        assert_eq!(α, 1.25);

        // a smaller starting value is left alone
        let mut α = 0.5;
        blk.linesearch(&mut α).unwrap();
        assert_eq!(α, 0.5);
    }

    #[test]
    fn test_linesearch_without_step() {
        let mut blk = NonnegativeBlock::<f64>::new(2);
        let mut α = 1.0;
        assert_eq!(blk.linesearch(&mut α), Err(ConeBlockError::StepUnavailable));
    }

    #[test]
    fn test_set_x_correction() {
        let mut blk = NonnegativeBlock::<f64>::new(3);
        assert_eq!(blk.set_x(&[9.0, 1.0, 2.0, 3.0], 1).unwrap(), 0.0);

        let shift = blk.set_x(&[-1.0, 0.5, 0.5], 0).unwrap();
        assert_eq!(shift, 2.0);

        // values are loaded verbatim, so scaling fails until corrected
        let mut v = vec![0.0; 3];
        blk.get_vecx(&mut v, 0);
        assert_eq!(v, vec![-1.0, 0.5, 0.5]);
        assert_eq!(blk.compute_NTscaling(), Err(ConeBlockError::NotInterior));

        blk.center_x(shift, true);
        blk.get_vecx(&mut v, 0);
        assert_eq!(v, vec![1.0, 2.5, 2.5]);
        assert!(blk.compute_NTscaling().is_ok());
    }

    #[test]
    fn test_missing_complementarity_rhs() {
        let mut blk = NonnegativeBlock::<f64>::new(2);
        assert_eq!(
            blk.set_dx(&[1.0, 1.0], 0),
            Err(ConeBlockError::MissingComplementarityRhs)
        );
        assert_eq!(ConeBlockError::MissingComplementarityRhs.code(), 3);
    }

    #[test]
    fn test_corrector_needs_step() {
        let mut blk = NonnegativeBlock::<f64>::new(2);
        let mut rhs = vec![0.0; 2];
        assert_eq!(
            blk.add_muxinv(&mut rhs, 0, 1.0, 1.0, false),
            Err(ConeBlockError::StepUnavailable)
        );
    }

    #[test]
    fn test_add_muxinv_with_correction() {
        let mut blk = block_with_step();
        // dx∘dz = (0, 0, -0.48), x = e
        let mut rhs = vec![1.0; 3];
        blk.add_muxinv(&mut rhs, 0, 0.5, 1.0, true).unwrap();
        assert!(rhs.norm_inf_diff(&[0.5, 0.5, 0.5 - 0.48]) < 1e-14);
    }

    #[test]
    fn test_do_step() {
        let mut blk = NonnegativeBlock::<f64>::new(3);
        blk.center_x(1.0, false);
        blk.center_z(2.0, false);

        let mut rhs = vec![0.0; 3];
        blk.add_muxinv(&mut rhs, 0, 0.25, 0.0, false).unwrap();
        blk.set_dx(&[-0.5, 0.0, 0.3], 0).unwrap();
        blk.do_step(0.5).unwrap();

        let mut x = vec![0.0; 3];
        let mut z = vec![0.0; 3];
        blk.get_vecx(&mut x, 0);
        blk.get_vecz(&mut z, 0);
        assert!(x.norm_inf_diff(&[0.75, 1.0, 1.15]) < 1e-14);
        // dz = -2dx - z + 0.25/x = (-0.75, -1.75, -2.35)
        assert!(z.norm_inf_diff(&[1.625, 1.125, 0.825]) < 1e-14);

        assert_eq!(blk.get_last_alpha(), 0.5);
        assert_eq!(blk.get_mu(), 0.25);
        assert_eq!(blk.get_old_mu(), 0.0);
        assert_eq!(blk.get_oldx(), &[1.0, 1.0, 1.0]);
        assert_eq!(blk.get_oldz(), &[2.0, 2.0, 2.0]);

        // step and caches are gone after a move
        assert_eq!(blk.get_vecdx(&mut x, 0), Err(ConeBlockError::StepUnavailable));
        assert_eq!(blk.do_step(0.5), Err(ConeBlockError::StepUnavailable));
    }

    #[test]
    fn test_nbh_cap() {
        // x∘z = (1, 4), mu = 2.5; pushing the first product down
        let mut blk = NonnegativeBlock::<f64>::new(2);
        blk.set_x(&[1.0, 2.0], 0).unwrap();
        blk.set_z(&[1.0, 2.0], 0).unwrap();
        let mut rhs = vec![0.0; 2];
        blk.add_muxinv(&mut rhs, 0, 0.0, 0.0, false).unwrap();
        blk.set_dx(&[-0.5, 0.0], 0).unwrap();

        let mut mu = MuInfo::new();
        blk.get_mu_info(&mut mu).unwrap();

        let mut α = 1.0;
        let mut nbh = NbhInfo::default();
        blk.get_nbh_info(&mu, 0.9, &mut α, &mut nbh).unwrap();
        assert!(α > 0.0 && α < 1.0);

        // at the capped step the smallest product sits on the boundary
        let p: Vec<f64> = (0..2)
            .map(|i| {
                let x = [1.0, 2.0][i] + α * [-0.5, 0.0][i];
                let z = [1.0, 2.0][i] + α * [-0.5, -2.0][i];
                x * z
            })
            .collect();
        assert!((p.minimum() - 0.1 * mu.mu_at(α)).abs() < 1e-12);
        assert!((nbh.max_nbh - 0.9).abs() < 1e-10);

        // centered squared norm at α = 0
        assert!((nbh.nrmsqr_at(0.0) - 4.5).abs() < 1e-14);
    }
}
