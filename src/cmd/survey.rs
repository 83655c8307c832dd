use crate::reports::{self, SurveyRow};
use clap::Args;
use ledforge::api;
use ledforge::calibration::CalibrationState;
use ledforge::config::MappingConfig;
use ledforge::error::LfResult;
use ledforge::geometry::KeyboardSize;
use rayon::prelude::*;
use strum::IntoEnumIterator;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SurveyArgs {
    #[command(flatten)]
    pub config: MappingConfig,
}

pub fn run(config: &MappingConfig, calibration: &CalibrationState) -> LfResult<()> {
    let sizes: Vec<KeyboardSize> = KeyboardSize::iter().collect();
    info!("🔥 Surveying {} keyboard sizes in parallel", sizes.len());

    // Every run builds its own geometry and mapping; nothing is shared.
    let rows: Vec<SurveyRow> = sizes
        .par_iter()
        .map(|&size| {
            let mut sized = config.clone();
            sized.strip.key_count = size.key_count();
            let outcome = api::compute_mapping(&sized, calibration).map(|run| {
                let diagnostics = run.diagnostics();
                (run, diagnostics)
            });
            SurveyRow { size, outcome }
        })
        .collect();

    reports::print_survey_table(&rows);
    Ok(())
}
