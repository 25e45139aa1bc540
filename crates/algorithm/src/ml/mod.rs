//! Machine learning regressors
//!
//! - **Boosted trees**: gradient boosted regression trees over tabular features

pub mod boosting;

pub use boosting::{BoostedTrees, BoostingParams};
