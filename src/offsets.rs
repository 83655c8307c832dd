use crate::calibration::CalibrationState;
use crate::geometry::{KeyboardGeometry, PianoKey};
use crate::mapping::{FinalMapping, KeyLedAssignment, KeyMapping, MappingWarning};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct OffsetResult {
    pub mapping: FinalMapping,
    pub warnings: Vec<MappingWarning>,
}

/// Applies user calibration to a base mapping, in order: cascading offset,
/// per-key trim, weld compensation.
///
/// Pure: the same base mapping and snapshot always give the same result.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationOffsetProcessor<'a> {
    calibration: &'a CalibrationState,
    led_count: usize,
    pitch_mm: f64,
}

impl<'a> CalibrationOffsetProcessor<'a> {
    /// `pitch_mm` is the calibrated pitch, used to turn weld millimetres into LED steps.
    pub fn new(calibration: &'a CalibrationState, led_count: usize, pitch_mm: f64) -> Self {
        Self {
            calibration,
            led_count,
            pitch_mm,
        }
    }

    pub fn apply(&self, geometry: &KeyboardGeometry, base: &KeyLedAssignment) -> OffsetResult {
        let mut warnings = Vec::new();
        let keys = geometry
            .keys
            .iter()
            .map(|key| {
                let indices = base.indices(key.index);
                let leds = if self.calibration.enabled {
                    self.calibrate_key(key, indices, &mut warnings)
                } else {
                    indices
                };
                KeyMapping {
                    key_index: key.index,
                    note_number: key.note_number,
                    leds,
                }
            })
            .collect();

        for w in &warnings {
            warn!("{}", w);
        }

        OffsetResult {
            mapping: FinalMapping::new(keys),
            warnings,
        }
    }

    fn calibrate_key(
        &self,
        key: &PianoKey,
        indices: Vec<usize>,
        warnings: &mut Vec<MappingWarning>,
    ) -> Vec<usize> {
        let note = key.note_number;

        // 1. Cascading offset
        let offset = self.calibration.effective_offset(note);
        let mut leds = self.clamp_all(
            note,
            indices.iter().map(|&i| (i as i64).saturating_add(offset)),
            warnings,
        );

        // 2. Trim
        if let Some(trim) = self.calibration.trim_for(note) {
            let available = leds.len();
            if trim.left.saturating_add(trim.right) >= available {
                warnings.push(MappingWarning::EmptyTrim {
                    note_number: note,
                    left: trim.left,
                    right: trim.right,
                    available,
                });
            } else {
                leds = leds[trim.left..available - trim.right].to_vec();
            }
        }

        // 3. Welds
        if self.calibration.has_welds() && self.pitch_mm > 0.0 {
            let shifted = leds.iter().map(|&i| {
                // `as` saturates for huge displacements; clamping handles the rest.
                let steps = (self.calibration.weld_shift_mm(i) / self.pitch_mm).round() as i64;
                (i as i64).saturating_sub(steps)
            });
            leds = self.clamp_all(note, shifted, warnings);
        }

        leds
    }

    /// Clamps into the physical strip, reporting the first clamp per key and stage.
    fn clamp_all(
        &self,
        note: u8,
        requested: impl Iterator<Item = i64>,
        warnings: &mut Vec<MappingWarning>,
    ) -> Vec<usize> {
        let max_index = self.led_count.saturating_sub(1) as i64;
        let mut reported = false;

        let mut out: Vec<usize> = requested
            .map(|r| {
                let clamped = r.clamp(0, max_index);
                if clamped != r && !reported {
                    reported = true;
                    warnings.push(MappingWarning::RangeClamp {
                        note_number: note,
                        requested: r,
                        clamped: clamped as usize,
                    });
                }
                clamped as usize
            })
            .collect();

        out.sort_unstable();
        out.dedup();
        out
    }
}
