//! Rate models: Fisher conversion, survey horizons, output gaps, the
//! gap-adjusted decomposition and bond-implied long-run rates.

pub mod decompose;
pub mod fisher;
pub mod gap;
pub mod horizon;
pub mod market;

pub use decompose::*;
pub use fisher::*;
pub use gap::*;
pub use horizon::*;
pub use market::*;
