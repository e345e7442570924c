//! Core types and trait definitions for the aqualog consumption tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod chart;
pub mod error;
pub mod evaluator;
pub mod ledger;
pub mod profile;
pub mod reward;
pub mod store;

pub use error::{Error, Result};
