//! Parameter estimation.
//!
//! Responsibilities:
//!
//! - the loss between curve samples and observations (`loss`)
//! - bounded local simplex search (`simplex`)
//! - bounded global population search (`evolution`)
//! - restarts + selection of the best candidate (`fitter`)

pub mod evolution;
pub mod fitter;
pub mod loss;
pub mod simplex;

pub use evolution::*;
pub use fitter::*;
pub use loss::*;
pub use simplex::*;
