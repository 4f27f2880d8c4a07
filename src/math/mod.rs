//! Numerical building blocks: least squares, HP filter, Hamilton trend.

pub mod hamilton;
pub mod hp;
pub mod ols;

pub use hamilton::*;
pub use hp::*;
pub use ols::*;
