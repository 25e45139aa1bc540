//! # airaware
//!
//! Batch pipelines for air-quality forecasting: day-of-week AQI forecasts,
//! pollutant trends, model comparison and AQI model training.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_INPUT: &str = "city_hour_final.csv";

#[derive(Parser)]
#[command(name = "airaware")]
#[command(about = "Air-quality forecasting pipelines", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate 7-day AQI forecasts per city
    Forecast {
        /// Historical CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long, default_value = forecast::output::DAY_OF_WEEK_FILE)]
        output: PathBuf,

        /// Trained GBDT model (breakpoint table is used without one)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Seed for the forecast jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Disable the forecast jitter
        #[arg(long, conflicts_with = "seed")]
        no_jitter: bool,

        /// Forecast origin, YYYY-MM-DD (defaults to the local date)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Generate 7-day pollutant trends per city
    Trends {
        /// Historical CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long, default_value = forecast::output::TRENDS_FILE)]
        output: PathBuf,

        /// Recent rows used per city
        #[arg(long, default_value = "100")]
        window: usize,
    },

    /// Compare ARIMA, seasonal-trend and GBDT per pollutant
    Compare {
        /// Historical CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Directory for the result CSVs
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Train the GBDT AQI model
    Train {
        /// Historical CSV with an AQI column
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Model file; metadata is written next to it
        #[arg(short, long, default_value = "best_model_gbdt.model")]
        output: PathBuf,

        /// Seed for permutation importance
        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long, default_value = "100")]
        n_estimators: usize,

        #[arg(long, default_value = "6")]
        max_depth: u32,

        #[arg(long, default_value = "0.1")]
        learning_rate: f64,
    },

    /// List the cities in a dataset
    Cities {
        /// Historical CSV
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "airaware=info,forecast=info,data=info,model=info".into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Forecast {
            input,
            output,
            model,
            seed,
            no_jitter,
            today,
        } => commands::forecast::run(&input, &output, model.as_deref(), seed, no_jitter, today),
        Commands::Trends {
            input,
            output,
            window,
        } => commands::trends::run(&input, &output, window),
        Commands::Compare { input, out_dir } => commands::compare::run(&input, &out_dir),
        Commands::Train {
            input,
            output,
            seed,
            n_estimators,
            max_depth,
            learning_rate,
        } => {
            let params = algorithm::BoostingParams {
                n_estimators,
                max_depth,
                learning_rate,
            };
            commands::train::run(&input, &output, params, seed)
        }
        Commands::Cities { input } => commands::cities::run(&input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_defaults() {
        let cli = Cli::try_parse_from(["airaware", "forecast"]).unwrap();
        match cli.command {
            Commands::Forecast {
                input,
                output,
                model,
                no_jitter,
                ..
            } => {
                assert_eq!(input, PathBuf::from("city_hour_final.csv"));
                assert_eq!(output, PathBuf::from("precomputed-forecasts.json"));
                assert!(model.is_none());
                assert!(!no_jitter);
            }
            _ => panic!("Expected forecast command"),
        }
    }

    #[test]
    fn test_forecast_today_parses() {
        let cli =
            Cli::try_parse_from(["airaware", "forecast", "--today", "2024-02-29", "--seed", "7"])
                .unwrap();
        match cli.command {
            Commands::Forecast { today, seed, .. } => {
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 2, 29));
                assert_eq!(seed, Some(7));
            }
            _ => panic!("Expected forecast command"),
        }
    }

    #[test]
    fn test_seed_conflicts_with_no_jitter() {
        assert!(
            Cli::try_parse_from(["airaware", "forecast", "--seed", "1", "--no-jitter"]).is_err()
        );
    }

    #[test]
    fn test_train_params() {
        let cli = Cli::try_parse_from(["airaware", "train", "--max-depth", "4"]).unwrap();
        match cli.command {
            Commands::Train {
                max_depth,
                n_estimators,
                seed,
                ..
            } => {
                assert_eq!(max_depth, 4);
                assert_eq!(n_estimators, 100);
                assert_eq!(seed, 42);
            }
            _ => panic!("Expected train command"),
        }
    }
}
