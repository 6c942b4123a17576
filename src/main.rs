//! Simulator entry point: CLI wiring, logging and scenario execution.

mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use para14a::config::ScenarioConfig;
use para14a::io::export::export_csv;
use para14a::runner::run_scenario;

use crate::cli::Args;

/// Logs go to stderr so that stdout carries only step lines and the KPI report.
fn init_tracing(debug_mode: bool) {
    let default = if debug_mode {
        "info,para14a::control=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_scenario(args: &Args) -> ScenarioConfig {
    let loaded = if let Some(ref path) = args.scenario {
        ScenarioConfig::from_toml_file(path)
    } else if let Some(ref name) = args.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    })
}

fn main() {
    let args = Args::parse();

    let mut scenario = load_scenario(&args);
    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    init_tracing(scenario.controller.debug_mode);

    let run = run_scenario(&scenario);

    if !args.quiet {
        for r in &run.results {
            println!("{r}");
        }
        println!();
    }
    println!("{}", run.kpi);

    if let Some(ref path) = args.telemetry_out {
        if let Err(e) = export_csv(&run.results, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if args.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(para14a::api::AppState {
            config: run.config,
            relay_mode: run.scheme.as_str().to_string(),
            kpi: run.kpi,
            results: run.results,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(para14a::api::serve(state, addr)) {
            eprintln!("error: API server failed on {addr}: {e}");
            process::exit(1);
        }
    }
}
