#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for complaint hotspot analysis.
//!
//! Loads a complaints export, then lists offence types, computes the ranked
//! hotspots of one type (table, JSON and `GeoJSON` output), computes every
//! type in parallel, or offers an interactive menu of the known types.
//!
//! Parameters come from an optional TOML file and are overridden by flags.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hotspot_map_source::{Encoding, load_records};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "hotspot_map_cli", about = "Complaint hotspot clustering")]
struct Cli {
    /// Complaints export (`.csv` or `.zip`)
    #[arg(long)]
    data: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clustering distance threshold in radians
    #[arg(long)]
    epsilon: Option<f64>,

    /// Minimum neighbourhood size for a core point
    #[arg(long)]
    min_points: Option<usize>,

    /// Number of ranked hotspots to keep
    #[arg(long)]
    top_k: Option<usize>,

    /// Rows in the printed table
    #[arg(long)]
    rows: Option<usize>,

    /// Text encoding of the CSV (`utf-8` or `iso-8859-1`)
    #[arg(long, value_parser = parse_encoding)]
    encoding: Option<Encoding>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List offence types with record counts
    Categories,
    /// Compute hotspots for one offence type
    Hotspots {
        /// Offence type, matched exactly
        #[arg(long)]
        offence: String,
        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write the hotspots as a `GeoJSON` feature collection
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
    /// Compute hotspots for every offence type, one `GeoJSON` file each
    All {
        #[arg(long, default_value = "hotspots")]
        output_dir: PathBuf,
    },
    /// Choose offence types from a menu
    Interactive,
}

fn parse_encoding(value: &str) -> Result<Encoding, String> {
    value
        .parse()
        .map_err(|_| format!("unknown encoding '{value}'"))
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(epsilon) = self.epsilon {
            config.hotspots.epsilon_radians = epsilon;
        }
        if let Some(min_points) = self.min_points {
            config.hotspots.min_points = min_points;
        }
        if let Some(top_k) = self.top_k {
            config.hotspots.top_k = top_k;
        }
        if let Some(rows) = self.rows {
            config.display.table_rows = rows;
        }
        if let Some(encoding) = self.encoding {
            config.loader.encoding = encoding;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    log::info!(
        "epsilon = {:.2e} rad ({:.2} m), min_points = {}, top_k = {}",
        config.hotspots.epsilon_radians,
        config.hotspots.epsilon_meters(),
        config.hotspots.min_points,
        config.hotspots.top_k
    );

    let data = cli.data.clone();
    let loader = config.loader.clone();
    let records = Arc::new(tokio::task::spawn_blocking(move || load_records(&data, &loader)).await??);

    let params = config.hotspots;
    let rows = config.display.table_rows;

    match cli.command {
        Commands::Categories => commands::categories(&records),
        Commands::Hotspots {
            offence,
            json,
            geojson,
        } => commands::hotspots(
            &records,
            &offence,
            &params,
            rows,
            json.as_deref(),
            geojson.as_deref(),
        )?,
        Commands::All { output_dir } => commands::all(records, params, &output_dir).await?,
        Commands::Interactive => commands::interactive(&records, &params, rows)?,
    }

    Ok(())
}
