mod blaslike_traits;
mod cholesky;
mod core;
mod eigen;
mod gemm;
mod kernels;
mod matrix_math;
mod svec;
mod syrk;

pub use blaslike_traits::*;
pub use cholesky::*;
pub use eigen::EigEngine;
pub use kernels::DenseFloatT;
pub use svec::*;
