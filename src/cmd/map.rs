use crate::reports;
use clap::{Args, ValueEnum};
use ledforge::api;
use ledforge::calibration::CalibrationState;
use ledforge::config::MappingConfig;
use ledforge::error::LfResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    #[command(flatten)]
    pub config: MappingConfig,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn run(args: &MapArgs, config: &MappingConfig, calibration: &CalibrationState) -> LfResult<()> {
    let run = api::compute_mapping(config, calibration)?;

    match args.format {
        OutputFormat::Table => {
            reports::print_mapping_table(&run);
            reports::print_warnings(&run.warnings);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run.mapping)?),
        OutputFormat::Csv => run.mapping.write_csv(std::io::stdout().lock())?,
    }
    Ok(())
}
