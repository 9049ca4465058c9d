//! Mathematical utilities: least squares and summary statistics.

pub mod ols;

pub use ols::*;
