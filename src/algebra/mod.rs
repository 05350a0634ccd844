//! Dense linear algebra for the cone blocks.
//!
//! This module provides the small dense toolkit used by the cone blocks
//! and the reference solver: a column major [`Matrix`] type with
//! [`Adjoint`] views, BLAS-like products, a Cholesky engine, a symmetric
//! eigen engine and packing of symmetric matrices in scaled triangular form.
//! All routines are native Rust and generic over [`FloatT`].

mod error_types;
mod floats;
mod math_traits;
mod matrix_traits;
mod matrix_types;
mod scalarmath;
mod vecmath;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_traits::*;
pub use matrix_types::*;
pub use scalarmath::*;

mod dense;
pub use dense::*;
