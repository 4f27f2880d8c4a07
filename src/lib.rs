//! `neutral-rate` library crate.
//!
//! Proxies for the Brazilian neutral real interest rate, built from the BCB
//! Focus survey, GDP output gaps and NTN-B bond rates.
//!
//! The binary (`nr`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - stages are reusable from other front ends

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod rates;
pub mod report;
pub mod series;
