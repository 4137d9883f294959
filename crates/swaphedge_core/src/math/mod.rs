//! Numerical building blocks: interpolation and solvers.

pub mod interpolation;
pub mod solvers;

pub use interpolation::LinearInterpolator;
pub use solvers::{
    BracketedNewtonSolver, LMConfig, LMResult, LevenbergMarquardtSolver,
};
