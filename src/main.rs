use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use ledforge::calibration::CalibrationState;
use ledforge::config::MappingConfig;
use ledforge::error::LfResult;
use std::process;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON strip/key settings. Flags typed on the command line override it.
    #[arg(global = true, long)]
    config: Option<String>,

    /// JSON calibration snapshot (offsets, trims, welds).
    #[arg(global = true, long)]
    calibration: Option<String>,

    /// Overrides the snapshot's global offset.
    #[arg(global = true, long, allow_negative_numbers = true)]
    global_offset: Option<i32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the final key -> LED mapping.
    Map(cmd::map::MapArgs),
    /// Print quality diagnostics for the mapping.
    Validate(cmd::validate::ValidateArgs),
    /// Run every standard keyboard size against the same strip.
    Survey(cmd::survey::SurveyArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = execute(&cli, &matches) {
        error!("{}", e);
        process::exit(1);
    }
}

fn execute(cli: &Cli, matches: &ArgMatches) -> LfResult<()> {
    let (cli_config, sub_name) = match &cli.command {
        Commands::Map(args) => (&args.config, "map"),
        Commands::Validate(args) => (&args.config, "validate"),
        Commands::Survey(args) => (&args.config, "survey"),
    };

    let config = match (&cli.config, matches.subcommand_matches(sub_name)) {
        (Some(path), Some(sub_matches)) => {
            info!("📂 Loading settings from: {}", path);
            let mut file_config = MappingConfig::load_from_file(path)?;
            file_config.merge_from_cli(cli_config, sub_matches);
            file_config
        }
        _ => cli_config.clone(),
    };

    let mut calibration = match &cli.calibration {
        Some(path) => {
            info!("🎚️  Loading calibration from: {}", path);
            CalibrationState::load_from_file(path)?
        }
        None => CalibrationState::default(),
    };
    if let Some(offset) = cli.global_offset {
        calibration.global_offset = offset;
    }

    match &cli.command {
        Commands::Map(args) => cmd::map::run(args, &config, &calibration),
        Commands::Validate(args) => cmd::validate::run(args, &config, &calibration),
        Commands::Survey(_) => cmd::survey::run(&config, &calibration),
    }
}
