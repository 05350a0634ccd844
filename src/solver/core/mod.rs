// package together the following and re-export
// in a flattened structure :
// : settings validation errors
// : solver status and construction errors

mod settings;
mod solver;
pub use settings::*;
pub use solver::*;
