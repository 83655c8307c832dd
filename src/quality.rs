use crate::allocator::PitchCalibrationResult;
use crate::geometry::leds::LedStrip;
use crate::geometry::{KeyType, KeyboardGeometry, PianoKey};
use crate::mapping::{FinalMapping, MappingWarning};
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter};

const SYMMETRY_WEIGHT: f64 = 0.6;
const CONSISTENCY_WEIGHT: f64 = 0.4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::Excellent
        } else if score >= 0.70 {
            Self::Good
        } else if score >= 0.50 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyQuality {
    pub key_index: usize,
    pub note_number: u8,
    pub key_type: KeyType,
    pub led_indices: Vec<usize>,
    pub symmetry_score: f64,
    pub consistency_score: f64,
    pub combined_score: f64,
    pub quality_label: QualityGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateQuality {
    pub avg_leds_per_key: f64,
    pub total_leds_used: usize,
    pub total_entries: usize,
    pub shared_entries: usize,
    pub rescued_entries: usize,
    /// Keys whose LEDs form one unbroken run.
    pub consecutive_coverage_count: usize,
    pub grade_counts: BTreeMap<QualityGrade, usize>,
    pub overall_score: f64,
    pub overall_quality: QualityGrade,
    pub coverage_shortfall: bool,
}

/// Payload for validation/reporting surfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub per_key: Vec<KeyQuality>,
    pub aggregate: AggregateQuality,
    pub pitch_calibration: PitchCalibrationResult,
    pub warnings: Vec<MappingWarning>,
}

/// Read-only scoring of a final mapping against key geometry.
pub struct MappingQualityAnalyzer<'a> {
    geometry: &'a KeyboardGeometry,
    strip: &'a LedStrip,
}

impl<'a> MappingQualityAnalyzer<'a> {
    pub fn new(geometry: &'a KeyboardGeometry, strip: &'a LedStrip) -> Self {
        Self { geometry, strip }
    }

    /// 1.0 when the LEDs' mean center sits on the exposed midpoint,
    /// falling to 0.0 at the key's edge.
    pub fn symmetry_score(&self, key: &PianoKey, leds: &[usize]) -> f64 {
        if leds.is_empty() {
            return 0.0;
        }
        let half = key.exposed_width_mm() * 0.5;
        if half <= 0.0 {
            return 0.0;
        }
        let mean = leds
            .iter()
            .map(|&i| self.strip.placement_of(i).center_mm)
            .sum::<f64>()
            / leds.len() as f64;

        (1.0 - (mean - key.exposed_center_mm()).abs() / half).clamp(0.0, 1.0)
    }

    /// Penalises keys whose LEDs cover the surface by very different amounts.
    pub fn consistency_score(&self, key: &PianoKey, leds: &[usize]) -> f64 {
        if leds.is_empty() {
            return 0.0;
        }
        if leds.len() == 1 {
            return 1.0;
        }

        let fractions: Vec<f64> = leds
            .iter()
            .map(|&i| {
                let p = self.strip.placement_of(i);
                let width = p.width_mm();
                if width > 0.0 {
                    p.coverage_mm(key) / width
                } else {
                    0.0
                }
            })
            .collect();

        let n = fractions.len() as f64;
        let mean = fractions.iter().sum::<f64>() / n;
        let variance = fractions.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

        (1.0 - 2.0 * variance.sqrt()).clamp(0.0, 1.0)
    }

    pub fn analyze_key(&self, key: &PianoKey, leds: &[usize]) -> KeyQuality {
        let symmetry = self.symmetry_score(key, leds);
        let consistency = self.consistency_score(key, leds);
        let combined = SYMMETRY_WEIGHT * symmetry + CONSISTENCY_WEIGHT * consistency;

        KeyQuality {
            key_index: key.index,
            note_number: key.note_number,
            key_type: key.key_type,
            led_indices: leds.to_vec(),
            symmetry_score: symmetry,
            consistency_score: consistency,
            combined_score: combined,
            quality_label: QualityGrade::from_score(combined),
        }
    }

    pub fn analyze(&self, mapping: &FinalMapping) -> Vec<KeyQuality> {
        self.geometry
            .keys
            .iter()
            .map(|key| self.analyze_key(key, mapping.leds_for_key(key.index)))
            .collect()
    }

    pub fn diagnose(
        &self,
        mapping: &FinalMapping,
        pitch_calibration: PitchCalibrationResult,
        rescued_entries: usize,
        warnings: &[MappingWarning],
    ) -> Diagnostics {
        let per_key = self.analyze(mapping);
        let aggregate = aggregate(mapping, &per_key, rescued_entries, warnings);

        Diagnostics {
            per_key,
            aggregate,
            pitch_calibration,
            warnings: warnings.to_vec(),
        }
    }
}

fn aggregate(
    mapping: &FinalMapping,
    per_key: &[KeyQuality],
    rescued_entries: usize,
    warnings: &[MappingWarning],
) -> AggregateQuality {
    let key_count = mapping.len().max(1) as f64;
    let total_entries = mapping.total_entries();
    let total_leds_used = mapping.unique_leds().len();

    let consecutive_coverage_count = mapping
        .keys()
        .iter()
        .filter(|k| !k.leds.is_empty() && k.leds.windows(2).all(|w| w[1] == w[0] + 1))
        .count();

    let mut grade_counts = BTreeMap::new();
    for q in per_key {
        *grade_counts.entry(q.quality_label).or_insert(0) += 1;
    }

    let overall_score = if per_key.is_empty() {
        0.0
    } else {
        per_key.iter().map(|q| q.combined_score).sum::<f64>() / per_key.len() as f64
    };

    AggregateQuality {
        avg_leds_per_key: total_entries as f64 / key_count,
        total_leds_used,
        total_entries,
        shared_entries: total_entries - total_leds_used,
        rescued_entries,
        consecutive_coverage_count,
        grade_counts,
        overall_score,
        overall_quality: QualityGrade::from_score(overall_score),
        coverage_shortfall: warnings
            .iter()
            .any(|w| matches!(w, MappingWarning::CoverageShortfall { .. })),
    }
}
