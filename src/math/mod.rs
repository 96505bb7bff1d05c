//! Mathematical utilities: parameter-domain sampling and summary statistics.

pub mod sampling;
pub mod stats;

pub use sampling::*;
pub use stats::*;
