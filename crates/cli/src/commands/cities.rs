//! Cities command - lists the cities in a dataset.

use anyhow::Result;
use std::path::Path;

/// Runs the cities command.
pub fn run(input: &Path) -> Result<()> {
    let dataset = super::load_dataset(input)?;
    let cities = dataset.cities();

    println!("Total cities: {}", cities.len());
    for city in &cities {
        println!("  {}", city);
    }
    Ok(())
}
