//! `capm-curve` library crate.
//!
//! The binary (`capm`) is a thin wrapper around this library so that:
//!
//! - the CAPM computation is testable without network access or processes
//! - price sources and chart renderers are swappable behind traits
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod capm;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod math;
pub mod plot;
pub mod report;
