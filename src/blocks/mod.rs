//! Cone blocks for primal-dual interior point methods.
//!
//! A cone block owns one conic variable pair `(x,z)` together with its
//! step direction and a cached symmetric scaling.  All blocks expose the
//! same [`ConeBlock`] interface, addressing their slice of a global vector
//! through a `startindex` and adding their contribution to a shared,
//! fully symmetric system matrix.
//!
//! Two blocks are provided:
//!
//! - [`NonnegativeBlock`] for the nonnegative orthant, with the elementwise
//!   scaling `z ⊘ x`.
//! - [`SemidefiniteBlock`] for the cone of positive semidefinite matrices
//!   in scaled triangular (svec) form, with Nesterov-Todd scaling.
//!
//! The [`CompositeBlock`] holds a heterogeneous collection of blocks and
//! applies each operation over whole global vectors.

#![allow(non_snake_case)]

use crate::algebra::*;
use enum_dispatch::*;
use thiserror::Error;

//primitive block types
mod nonnegativeblock;
mod semidefiniteblock;

//the supported block wrapper type for primitives
//and the composite block
mod compositeblock;
mod supportedblock;

//shared neighborhood and centering computations
mod nbh_common;

//flatten all block implementations to appear in this module
pub use compositeblock::*;
pub use nonnegativeblock::*;
pub use semidefiniteblock::*;
pub use supportedblock::*;

/// Error type returned by cone block operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConeBlockError {
    /// The current point is not strictly interior where a scaling is needed
    #[error("point is not in the interior of the cone")]
    NotInterior,
    /// No step direction is available for the requested operation
    #[error("no step direction available")]
    StepUnavailable,
    /// `set_dx` was called before the complementarity right hand side was formed
    #[error("complementarity right hand side missing")]
    MissingComplementarityRhs,
    /// The line search found no positive step length
    #[error("no feasible positive step length")]
    NoFeasibleStep,
    /// Non-finite values were encountered
    #[error("non-finite values encountered")]
    NonFinite,
    /// A dense factorization failed
    #[error("dense factorization failed: {0}")]
    Factorization(#[from] DenseFactorizationError),
}

impl ConeBlockError {
    /// Nonzero integer status code for the error
    pub fn code(&self) -> i32 {
        match self {
            ConeBlockError::NotInterior => 1,
            ConeBlockError::StepUnavailable => 2,
            ConeBlockError::MissingComplementarityRhs => 3,
            ConeBlockError::NoFeasibleStep => 4,
            ConeBlockError::NonFinite => 5,
            ConeBlockError::Factorization(_) => 6,
        }
    }
}

/// Accumulated duality measure statistics over a collection of blocks.
///
/// Each block adds its own contribution in [`ConeBlock::get_mu_info`].  The
/// trace terms define the polynomial `mu(α) = (tr_xz + α tr_xdzpdxz +
/// α² tr_dxdz) / mudim` of the duality measure along the current step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuInfo<T> {
    /// total degree of the blocks seen so far
    pub mudim: usize,
    /// `<x,z>`
    pub tr_xz: T,
    /// `<x,dz> + <dx,z>`
    pub tr_xdzpdxz: T,
    /// `<dx,dz>`
    pub tr_dxdz: T,
    /// smallest pairwise product `x_i z_i` (eigenvalue of `XZ`)
    pub min_xz: T,
    /// largest pairwise product
    pub max_xz: T,
}

impl<T> MuInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            mudim: 0,
            tr_xz: T::zero(),
            tr_xdzpdxz: T::zero(),
            tr_dxdz: T::zero(),
            min_xz: T::infinity(),
            max_xz: -T::infinity(),
        }
    }

    /// duality measure at the current point
    pub fn mu(&self) -> T {
        self.mu_at(T::zero())
    }

    /// duality measure after a step of length `α`
    pub fn mu_at(&self, α: T) -> T {
        if self.mudim == 0 {
            return T::zero();
        }
        let tr = self.tr_xz + α * (self.tr_xdzpdxz + α * self.tr_dxdz);
        tr / self.mudim.as_T()
    }

    // coefficients of mu(α) as a polynomial in α
    pub(crate) fn mu_coeffs(&self) -> (T, T, T) {
        let d: T = self.mudim.as_T();
        (self.tr_xz / d, self.tr_xdzpdxz / d, self.tr_dxdz / d)
    }
}

impl<T> Default for MuInfo<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulated neighborhood statistics over a collection of blocks.
///
/// With `c_k` the coefficients of `mu(α)`, the centered pairwise products
/// are `v0 = xz - c0`, `v1 = x dz + dx z - c1` and `v2 = dx dz - c2`
/// (symmetrized matrix products for semidefinite blocks).  The fields hold
/// their squared norms and mutual inner products, so the squared distance
/// from the central path along the step is a quartic in `α`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NbhInfo<T> {
    pub nrmsqr_xz: T,
    pub nrmsqr_xdzpdxz: T,
    pub nrmsqr_dxdz: T,
    pub ip_xz_xdzpdxz: T,
    pub ip_xz_dxdz: T,
    pub ip_dxdz_xdzpdxz: T,
    /// largest relative deviation `1 - min_i p_i(α)/mu(α)` seen so far
    pub max_nbh: T,
}

impl<T> NbhInfo<T>
where
    T: FloatT,
{
    /// squared norm of the centered pairwise products after a step of length `α`
    pub fn nrmsqr_at(&self, α: T) -> T {
        let two: T = (2.).as_T();
        let α2 = α * α;
        self.nrmsqr_xz
            + α2 * self.nrmsqr_xdzpdxz
            + α2 * α2 * self.nrmsqr_dxdz
            + two * α * self.ip_xz_xdzpdxz
            + two * α2 * self.ip_xz_dxdz
            + two * α2 * α * self.ip_dxdz_xdzpdxz
    }
}

/// The capability contract shared by all cone blocks.
///
/// Slices are addressed by `startindex` into caller-owned global vectors
/// and must have room for [`get_vecdim`](ConeBlock::get_vecdim) entries
/// from there on.  Mismatched dimensions are programming errors and panic.
#[enum_dispatch]
pub trait ConeBlock<T>
where
    T: FloatT,
{
    /// Reset to the block of dimension `dim` at its centered point
    /// `x = z = e` and drop all cached data.  For semidefinite blocks
    /// `dim` is the order of the matrix.
    fn clear(&mut self, dim: usize);

    /// Length of the block's slice in a global vector
    fn get_vecdim(&self) -> usize;

    /// Set `x = val*e`, or add `val*e` to `x` if `add`
    fn center_x(&mut self, val: T, add: bool);

    /// Set `z = val*e`, or add `val*e` to `z` if `add`
    fn center_z(&mut self, val: T, add: bool);

    /// Load `x` from `vec[startindex..]`.  The values are taken as they
    /// are.  Returns the nonnegative shift along `e` needed to make `x`
    /// strictly interior, which is zero if it already is.
    fn set_x(&mut self, vec: &[T], startindex: usize) -> Result<T, ConeBlockError>;

    /// Load `z` from `vec[startindex..]`.  See [`set_x`](ConeBlock::set_x).
    fn set_z(&mut self, vec: &[T], startindex: usize) -> Result<T, ConeBlockError>;

    /// Write `a*x` into `vec[startindex..]`, or accumulate it if `add`
    fn vecgetsax(&self, vec: &mut [T], startindex: usize, a: T, add: bool);

    /// Write `a*z` into `vec[startindex..]`, or accumulate it if `add`
    fn vecgetsaz(&self, vec: &mut [T], startindex: usize, a: T, add: bool);

    /// Accumulate this block's duality measure statistics into `info`
    fn get_mu_info(&mut self, info: &mut MuInfo<T>) -> Result<(), ConeBlockError>;

    /// Accumulate neighborhood statistics into `info`, and reduce `alpha`
    /// so that every pairwise product stays above `(1-nbh_ubnd)*mu(α)`.
    fn get_nbh_info(
        &mut self,
        muinfo: &MuInfo<T>,
        nbh_ubnd: T,
        alpha: &mut T,
        info: &mut NbhInfo<T>,
    ) -> Result<(), ConeBlockError>;

    /// Reduce `alpha` to the largest step keeping `x+α dx` and `z+α dz`
    /// in the closed cone
    fn linesearch(&mut self, alpha: &mut T) -> Result<(), ConeBlockError>;

    /// Form the complementarity right hand side
    /// `rhsmu*x⁻¹ - rhscorr*x⁻¹∘dx∘dz`, cache it for the following call
    /// to `set_dx`, and add it to (or subtract it from) `rhs`.
    fn add_muxinv(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        rhsmu: T,
        rhscorr: T,
        minus: bool,
    ) -> Result<(), ConeBlockError>;

    /// Take `dx` from `rhs` and complete `dz = -xiz(dx) - z + compl_rhs`
    fn set_dx(&mut self, rhs: &[T], startindex: usize) -> Result<(), ConeBlockError>;

    /// Take `dx = xiz⁻¹(rhs)` and complete `dz = -rhs - z + compl_rhs`
    fn set_dx_xizsolverhs(&mut self, rhs: &[T], startindex: usize) -> Result<(), ConeBlockError>;

    /// Apply the inverse scaling in place, negated if `minus`
    fn apply_xizinv(
        &mut self,
        rhs: &mut [T],
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError>;

    /// Apply the scaling in place, negated if `minus`
    fn apply_xiz(&mut self, rhs: &mut [T], startindex: usize, minus: bool)
        -> Result<(), ConeBlockError>;

    /// Move to `x + α dx`, `z + α dz` and drop all cached data
    fn do_step(&mut self, alpha: T) -> Result<(), ConeBlockError>;

    /// Accumulate `±A xiz⁻¹ A'` into the symmetric `globalsys`.  `A` has
    /// one column per block entry, or one row per entry if `Atrans`.
    fn add_AxizinvAt(
        &mut self,
        A: &Matrix<T>,
        globalsys: &mut Matrix<T>,
        minus: bool,
        Atrans: bool,
    ) -> Result<(), ConeBlockError>;

    /// Add `±xiz` as the diagonal block of `globalsys` at `startindex`
    fn add_xiz(
        &mut self,
        globalsys: &mut Matrix<T>,
        startindex: usize,
        minus: bool,
    ) -> Result<(), ConeBlockError>;

    /// Copy `x` into `vec[startindex..]`
    fn get_vecx(&self, vec: &mut [T], startindex: usize);

    /// Copy `z` into `vec[startindex..]`
    fn get_vecz(&self, vec: &mut [T], startindex: usize);

    /// Copy `dx` into `vec[startindex..]`
    fn get_vecdx(&self, vec: &mut [T], startindex: usize) -> Result<(), ConeBlockError>;

    /// Copy `dz` into `vec[startindex..]`
    fn get_vecdz(&self, vec: &mut [T], startindex: usize) -> Result<(), ConeBlockError>;
}
