//! The batch run: fetch rows, classify eligible ones, write verdicts back.
//!
//! Runs are strictly sequential with a fixed pause between analyses and a
//! wall-clock budget. Rows that are not reached stay `Unpublished` and are
//! picked up by the next run.

pub mod driver;
pub mod error;
pub mod summary;

#[cfg(test)]
mod tests;

pub use driver::{BatchOptions, BatchScorer};
pub use error::BatchError;
pub use summary::{BatchSummary, Tally};
