use crate::reports;
use clap::Args;
use ledforge::api;
use ledforge::calibration::CalibrationState;
use ledforge::config::MappingConfig;
use ledforge::error::LfResult;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: MappingConfig,

    /// Dump the diagnostics payload as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Only list keys graded at or below this many points (0-100).
    #[arg(long)]
    pub below: Option<u8>,
}

pub fn run(
    args: &ValidateArgs,
    config: &MappingConfig,
    calibration: &CalibrationState,
) -> LfResult<()> {
    let run = api::compute_mapping(config, calibration)?;
    let diagnostics = run.diagnostics();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        return Ok(());
    }

    println!("\n🔎 === MAPPING AUDIT === 🔎");
    reports::print_pitch_report(&diagnostics.pitch_calibration, run.passes);

    let cutoff = args.below.map(|b| f64::from(b) / 100.0);
    let listed: Vec<_> = diagnostics
        .per_key
        .iter()
        .filter(|q| cutoff.map_or(true, |c| q.combined_score <= c))
        .cloned()
        .collect();
    reports::print_key_quality_table(&listed);
    reports::print_aggregate_report(&diagnostics.aggregate);
    reports::print_warnings(&diagnostics.warnings);
    Ok(())
}
