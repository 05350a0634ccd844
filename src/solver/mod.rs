//! Reference interior point solver built on cone blocks.
//!
//! The [`DefaultSolver`] solves the standard form conic program
//!
//! ```text
//!   minimize    c'x
//!   subject to  Ax = b,  x ∈ K
//! ```
//!
//! together with its dual `max b'y` subject to `A'y + z = c, z ∈ K*`,
//! where `K` is a product of the cone blocks in [`crate::blocks`].  Each
//! iteration takes a Mehrotra predictor-corrector step computed from the
//! dense Schur complement system `(A xiz⁻¹ A') dy = r`.

// internal module structure
pub(crate) mod core;
pub mod implementations;

//allows declaration of cone block constraints
pub use crate::blocks::{SupportedConeBlockT, SupportedConeBlockT::*};

//user facing status and error types
pub use crate::solver::core::{SettingsError, SolverError, SolverStatus};

pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
