//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations and model parameters (`Observation`, `Params`, `ParamBounds`)
//! - fit configuration (`FitConfig`, `LossKind`, search options)
//! - fit outputs (`FitResult`, `Candidate`, `ResidualRow`)

pub mod types;

pub use types::*;
