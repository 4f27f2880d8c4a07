//! Series transformations: calendar aggregation and inner joins.

pub mod aggregate;
pub mod join;

pub use aggregate::*;
pub use join::*;
