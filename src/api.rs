use crate::allocator::{
    CascadeOutcome, OverlapAllocator, PitchCalibrationCascade, PitchCalibrationResult,
};
use crate::calibration::CalibrationState;
use crate::config::MappingConfig;
use crate::error::LfResult;
use crate::geometry::leds::LedStrip;
use crate::geometry::KeyboardGeometry;
use crate::mapping::{FinalMapping, KeyLedAssignment, MappingWarning};
use crate::offsets::CalibrationOffsetProcessor;
use crate::quality::{Diagnostics, MappingQualityAnalyzer};
use tracing::{debug, info, warn};

/// Everything one pipeline run produces. Each run builds fresh values;
/// nothing here is shared with other runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRun {
    pub geometry: KeyboardGeometry,
    /// Strip at the pitch the authoritative pass used.
    pub strip: LedStrip,
    pub base: KeyLedAssignment,
    pub mapping: FinalMapping,
    pub pitch: PitchCalibrationResult,
    pub passes: u8,
    pub rescued: usize,
    pub warnings: Vec<MappingWarning>,
}

impl MappingRun {
    pub fn diagnostics(&self) -> Diagnostics {
        MappingQualityAnalyzer::new(&self.geometry, &self.strip).diagnose(
            &self.mapping,
            self.pitch,
            self.rescued,
            &self.warnings,
        )
    }

    /// Re-applies a different calibration snapshot to this run's base mapping.
    pub fn recalibrate(
        &self,
        config: &MappingConfig,
        calibration: &CalibrationState,
    ) -> LfResult<Self> {
        calibration.validate()?;
        let processed = CalibrationOffsetProcessor::new(
            calibration,
            config.strip.led_count,
            self.strip.pitch_mm(),
        )
        .apply(&self.geometry, &self.base);

        let mut warnings: Vec<MappingWarning> = self
            .warnings
            .iter()
            .filter(|w| matches!(w, MappingWarning::CoverageShortfall { .. }))
            .cloned()
            .collect();
        warnings.extend(processed.warnings);

        Ok(Self {
            mapping: processed.mapping,
            warnings,
            ..self.clone()
        })
    }
}

/// Geometry + allocation + rescue + pitch cascade, without calibration.
pub fn compute_base(config: &MappingConfig) -> LfResult<(KeyboardGeometry, CascadeOutcome)> {
    config.validate()?;

    let geometry = KeyboardGeometry::from_key_count(config.strip.key_count, &config.keys)?;
    let nominal = LedStrip::from_params(&config.strip);
    let allocator = OverlapAllocator::new(
        config.strip.allocation_mode,
        config.strip.overhang_threshold_mm,
    );

    let outcome = PitchCalibrationCascade::new(allocator).run(&geometry, &nominal);
    debug!(
        "Base mapping: {} passes, {} entries, {} rescued",
        outcome.passes,
        outcome.mapping.total_entries(),
        outcome.rescued
    );
    Ok((geometry, outcome))
}

/// Full pipeline: validated config + calibration snapshot -> final mapping.
pub fn compute_mapping(
    config: &MappingConfig,
    calibration: &CalibrationState,
) -> LfResult<MappingRun> {
    calibration.validate()?;
    let (geometry, outcome) = compute_base(config)?;

    let mut warnings = Vec::new();
    if let Some(shortfall) = outcome.shortfall.clone() {
        warn!("{}", shortfall);
        warnings.push(shortfall);
    }

    let processed = CalibrationOffsetProcessor::new(
        calibration,
        config.strip.led_count,
        outcome.strip.pitch_mm(),
    )
    .apply(&geometry, &outcome.mapping);
    warnings.extend(processed.warnings);

    info!(
        "Mapped {} keys onto LEDs {}..={} ({} entries, {} warning(s))",
        processed.mapping.len(),
        config.strip.start_led,
        config.strip.end_led,
        processed.mapping.total_entries(),
        warnings.len()
    );

    Ok(MappingRun {
        geometry,
        strip: outcome.strip,
        base: outcome.mapping,
        mapping: processed.mapping,
        pitch: outcome.pitch,
        passes: outcome.passes,
        rescued: outcome.rescued,
        warnings,
    })
}
