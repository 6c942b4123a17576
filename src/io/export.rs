//! CSV export for simulation step results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepResult;

/// Column header for CSV telemetry export.
const HEADER: &str = "timestep,time_hr,production_level,consumption_level,grid_w,\
                       household_w,pv_available_w,pv_active_w,pv_hardware_w,\
                       pv_limit_sum_w,evcs_count,evcs_budget_w,evcs_active_w,health";

/// Exports simulation results to a CSV file at the given path.
///
/// Writes a header row followed by one data row per step. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `results` - Complete simulation step results
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// Levels are written as their numeric codes. An unrestricted PV limit is an
/// empty field; an unlimited EVCS budget is `-1`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.timestep.to_string(),
            format!("{:.2}", r.time_hr),
            r.production.code().to_string(),
            r.consumption.code().to_string(),
            r.grid_w.to_string(),
            r.household_w.to_string(),
            r.pv_available_w.to_string(),
            r.pv_active_w.to_string(),
            r.pv_hardware_w.to_string(),
            r.pv_limit_sum_w.map(|w| w.to_string()).unwrap_or_default(),
            r.evcs_count.to_string(),
            r.evcs_budget_w.to_string(),
            r.evcs_active_w.to_string(),
            r.health.as_str().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ConsumptionLevel, Health, ProductionLevel};

    fn make_step(t: usize) -> StepResult {
        StepResult {
            timestep: t,
            time_hr: t as f32 * 0.25,
            production: ProductionLevel::Reduced60,
            consumption: ConsumptionLevel::Full,
            grid_w: -1_200,
            household_w: 650,
            pv_available_w: 7_000,
            pv_active_w: 6_000,
            pv_hardware_w: 10_000,
            pv_limit_sum_w: Some(6_000),
            evcs_count: 2,
            evcs_budget_w: -1,
            evcs_active_w: 0,
            health: Health::Ok,
        }
    }

    fn to_string(results: &[StepResult]) -> String {
        let mut buf = Vec::new();
        write_csv(results, &mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn header_lists_every_column() {
        let output = to_string(&[make_step(0)]);
        let first_line = output.lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "timestep,time_hr,production_level,consumption_level,grid_w,\
             household_w,pv_available_w,pv_active_w,pv_hardware_w,\
             pv_limit_sum_w,evcs_count,evcs_budget_w,evcs_active_w,health"
        );
    }

    #[test]
    fn row_count_matches_step_count() {
        let results: Vec<StepResult> = (0..24).map(make_step).collect();
        let output = to_string(&results);
        assert_eq!(output.lines().count(), 25);
    }

    #[test]
    fn unrestricted_limit_is_empty_field() {
        let mut step = make_step(4);
        step.production = ProductionLevel::Full;
        step.pv_limit_sum_w = None;
        let output = to_string(&[step]);
        let row = output.lines().nth(1).unwrap_or("");
        assert_eq!(row, "4,1.00,3,3,-1200,650,7000,6000,10000,,2,-1,0,ok");
    }

    #[test]
    fn output_is_deterministic() {
        let results: Vec<StepResult> = (0..10).map(make_step).collect();
        assert_eq!(to_string(&results), to_string(&results));
    }
}
