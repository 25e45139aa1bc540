//! CLI command implementations.

pub mod cities;
pub mod compare;
pub mod forecast;
pub mod train;
pub mod trends;

use anyhow::{Context, Result};
use data::Dataset;
use std::path::Path;

/// Load the historical dataset; the only fatal input failure.
fn load_dataset(input: &Path) -> Result<Dataset> {
    data::load_csv(input).with_context(|| format!("Failed to load {}", input.display()))
}
