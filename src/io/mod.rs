//! Input/output helpers.
//!
//! - chart frame CSV/JSON exports (`export`)
//! - chart frame CSV reload for `nr plot` (`frame`)

pub mod export;
pub mod frame;

pub use export::*;
pub use frame::*;
