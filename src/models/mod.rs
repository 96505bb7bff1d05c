//! The parametric curve model.
//!
//! Implemented as small, pure functions so that fitting/search code can stay
//! generic over where the parameters come from.

pub mod model;

pub use model::*;
