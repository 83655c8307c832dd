use crate::consts::GLOBAL_OFFSET_LIMIT;
use crate::error::{LedForgeError, LfResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// LEDs dropped from the low (`left`) and high (`right`) end of a key's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyTrim {
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
}

/// Snapshot of the user's calibration, read once at the start of a run.
///
/// Per-key maps are keyed by MIDI note number; weld offsets by absolute LED index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationState {
    pub enabled: bool,
    pub global_offset: i32,
    pub key_offsets: BTreeMap<u8, i32>,
    pub key_led_trims: BTreeMap<u8, KeyTrim>,
    pub weld_offsets: BTreeMap<usize, f64>,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            enabled: true,
            global_offset: 0,
            key_offsets: BTreeMap::new(),
            key_led_trims: BTreeMap::new(),
            weld_offsets: BTreeMap::new(),
        }
    }
}

impl CalibrationState {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LfResult<Self> {
        let content = fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content)?;
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> LfResult<()> {
        if !(-GLOBAL_OFFSET_LIMIT..=GLOBAL_OFFSET_LIMIT).contains(&self.global_offset) {
            return Err(LedForgeError::Config(format!(
                "global_offset {} outside [-{limit}, {limit}]",
                self.global_offset,
                limit = GLOBAL_OFFSET_LIMIT
            )));
        }
        if let Some((led, mm)) = self.weld_offsets.iter().find(|(_, mm)| !mm.is_finite()) {
            return Err(LedForgeError::Config(format!(
                "weld offset at LED {} is not a number ({})",
                led, mm
            )));
        }
        Ok(())
    }

    pub fn with_global_offset(mut self, offset: i32) -> Self {
        self.global_offset = offset;
        self
    }

    pub fn with_key_offset(mut self, note_number: u8, offset: i32) -> Self {
        self.key_offsets.insert(note_number, offset);
        self
    }

    pub fn with_trim(mut self, note_number: u8, left: usize, right: usize) -> Self {
        self.key_led_trims
            .insert(note_number, KeyTrim { left, right });
        self
    }

    pub fn with_weld(mut self, led_index: usize, offset_mm: f64) -> Self {
        self.weld_offsets.insert(led_index, offset_mm);
        self
    }

    /// Cascading offset: every key offset registered at or below `note_number`
    /// applies, on top of the global offset.
    /// Summed in `i64`: at most 256 `i32` terms, so it cannot overflow.
    pub fn effective_offset(&self, note_number: u8) -> i64 {
        let cascaded: i64 = self
            .key_offsets
            .range(..=note_number)
            .map(|(_, v)| i64::from(*v))
            .sum();
        i64::from(self.global_offset) + cascaded
    }

    pub fn trim_for(&self, note_number: u8) -> Option<KeyTrim> {
        self.key_led_trims.get(&note_number).copied()
    }

    /// Accumulated splice displacement for an LED: all welds at or before it.
    pub fn weld_shift_mm(&self, led_index: usize) -> f64 {
        self.weld_offsets.range(..=led_index).map(|(_, mm)| *mm).sum()
    }

    pub fn has_welds(&self) -> bool {
        !self.weld_offsets.is_empty()
    }
}
