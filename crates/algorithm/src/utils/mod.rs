//! Utilities shared by the models and the pipelines

pub mod metrics;
pub mod preprocessing;
pub mod validation;

pub use metrics::*;
pub use preprocessing::*;
pub use validation::*;
