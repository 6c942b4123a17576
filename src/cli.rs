use std::path::PathBuf;

use clap::Parser;

/// §14a restriction-mode controller simulator.
///
/// If neither `--scenario` nor `--preset` is given, the baseline preset is used.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Load the scenario from a TOML file.
    #[clap(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, production_cap, consumption_dimming).
    #[clap(long)]
    pub preset: Option<String>,

    /// Override the random seed.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Export step results to CSV.
    #[clap(long = "telemetry-out")]
    pub telemetry_out: Option<PathBuf>,

    /// Print only the KPI report.
    #[clap(long, short)]
    pub quiet: bool,

    /// Start the REST API server after the simulation.
    #[cfg(feature = "api")]
    #[clap(long)]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[clap(long, default_value = "3000")]
    pub port: u16,
}
