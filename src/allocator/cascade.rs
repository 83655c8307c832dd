use super::{GapRescueResolver, OverlapAllocator};
use crate::consts::PITCH_EPSILON_MM;
use crate::geometry::leds::LedStrip;
use crate::geometry::KeyboardGeometry;
use crate::mapping::{KeyLedAssignment, MappingWarning};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchCalibrationResult {
    pub theoretical_pitch_mm: f64,
    pub calibrated_pitch_mm: f64,
    pub adjusted: bool,
}

/// Allocation + rescue at one pitch.
#[derive(Debug, Clone, PartialEq)]
struct PassResult {
    mapping: KeyLedAssignment,
    max_led_assigned: Option<usize>,
    rescued: usize,
}

impl PassResult {
    fn has_shortfall(&self, strip: &LedStrip) -> bool {
        match self.max_led_assigned {
            None => true,
            Some(max) => max < strip.end_led() || !self.mapping.empty_keys().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub mapping: KeyLedAssignment,
    /// The strip the authoritative pass ran against.
    pub strip: LedStrip,
    pub pitch: PitchCalibrationResult,
    /// Allocation + rescue invocations (1 or 2).
    pub passes: u8,
    pub max_led_assigned: Option<usize>,
    pub rescued: usize,
    pub shortfall: Option<MappingWarning>,
}

/// Runs allocation + rescue at nominal pitch and, when coverage falls short,
/// exactly once more at a closed-form corrected pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchCalibrationCascade {
    allocator: OverlapAllocator,
    resolver: GapRescueResolver,
}

impl PitchCalibrationCascade {
    pub fn new(allocator: OverlapAllocator) -> Self {
        Self {
            allocator,
            resolver: GapRescueResolver::new(),
        }
    }

    fn pass(&self, geometry: &KeyboardGeometry, strip: &LedStrip) -> PassResult {
        let outcome = self.allocator.allocate(geometry, strip);
        let mut mapping = outcome.mapping;
        let rescued = self.resolver.resolve(geometry, strip, &mut mapping);
        PassResult {
            mapping,
            max_led_assigned: outcome.max_led_assigned,
            rescued,
        }
    }

    pub fn run(&self, geometry: &KeyboardGeometry, nominal: &LedStrip) -> CascadeOutcome {
        let theoretical = nominal.pitch_mm();
        let first = self.pass(geometry, nominal);

        let mut passes = 1;
        let mut strip = nominal.clone();
        let mut result = first;

        if result.has_shortfall(nominal) {
            match corrected_pitch(geometry, nominal) {
                Some(pitch) => {
                    info!(
                        "Pitch calibration: coverage short (max LED {:?} of {}), {:.4} mm -> {:.4} mm",
                        result.max_led_assigned,
                        nominal.end_led(),
                        theoretical,
                        pitch
                    );
                    strip = nominal.with_pitch(pitch);
                    result = self.pass(geometry, &strip);
                    passes += 1;
                }
                None => debug!("Pitch calibration: shortfall but no usable correction"),
            }
        }

        let shortfall = if result.has_shortfall(&strip) {
            Some(MappingWarning::CoverageShortfall {
                max_led_assigned: result.max_led_assigned,
                end_led: strip.end_led(),
                empty_keys: result.mapping.empty_keys().len(),
            })
        } else {
            None
        };

        CascadeOutcome {
            pitch: PitchCalibrationResult {
                theoretical_pitch_mm: theoretical,
                calibrated_pitch_mm: strip.pitch_mm(),
                adjusted: passes > 1,
            },
            mapping: result.mapping,
            strip,
            passes,
            max_led_assigned: result.max_led_assigned,
            rescued: result.rescued,
            shortfall,
        }
    }
}

/// Scales the pitch so the first active LED center and the last one span
/// from the strip offset to the far edge of the last key:
/// `pitch * desired_span / covered_span`.
pub fn corrected_pitch(geometry: &KeyboardGeometry, strip: &LedStrip) -> Option<f64> {
    let last = geometry.keys.last()?;
    let intervals = strip.end_led().checked_sub(strip.start_led())?;
    if intervals == 0 {
        return None;
    }

    let nominal = strip.pitch_mm();
    let desired = last.exposed_end_mm - strip.led_width_mm() / 2.0 - strip.center_offset_mm();
    let covered = intervals as f64 * nominal;
    if !(desired > 0.0 && covered > 0.0) {
        return None;
    }

    let pitch = nominal * desired / covered;
    if !pitch.is_finite() || pitch <= 0.0 || (pitch - nominal).abs() < PITCH_EPSILON_MM {
        return None;
    }
    Some(pitch)
}
