//! FoodLens Core
//!
//! Types shared across FoodLens components.
//!
//! This crate provides:
//! - Error types and result handling
//! - The `Prediction` value returned by image classifiers

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Prediction, ScoredLabel};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Prediction, ScoredLabel};
}
