//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - calendar periods and frequencies (`Period`, `Frequency`)
//! - period-indexed series and wide tables (`Series`, `Table`)
//! - long-format chart output (`ChartFrame`)
//! - raw fetcher rows (`SurveyObservation`, `BondQuote`, ...)
//! - run configuration and labels (`PipelineConfig`, `labels`)

pub mod frame;
pub mod period;
pub mod raw;
pub mod series;
pub mod types;

pub use frame::*;
pub use period::*;
pub use raw::*;
pub use series::*;
pub use types::*;
