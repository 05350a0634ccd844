//! __conicblocks__ provides cone blocks for primal-dual interior point
//! methods.  A cone block owns one conic variable pair `(x,z)`, its step
//! direction and a symmetric scaling `xiz` that maps primal to dual
//! directions.  Blocks contribute to the Newton system of an interior point
//! method through a small common interface, so a driver can assemble and
//! solve the system without knowing which cones it is working with.
//!
//! The following cones are supported:
//!
//! * the nonnegative orthant, with scaling `z ⊘ x`
//! * the cone of positive semidefinite matrices, with Nesterov-Todd scaling
//!   on the scaled upper triangular (svec) representation
//!
//! A dense Mehrotra predictor-corrector [`DefaultSolver`](solver::DefaultSolver)
//! is included for problems in the standard form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & c^T x\\\\\[2ex\]
//!  \text{subject to} & Ax = b \\\\\[1ex\]
//!         & x \in \mathcal{K}
//!  \end{array}
//! $$
//!
//! where $\mathcal{K}$ is a product of the supported cones.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod blocks;
pub mod io;
pub mod solver;
