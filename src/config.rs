use crate::allocator::AllocationMode;
use crate::consts::*;
use crate::error::{LedForgeError, LfResult};
use crate::geometry::KeyboardSize;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MappingConfig {
    #[command(flatten)]
    #[serde(default)]
    pub strip: StripParams,
    #[command(flatten)]
    #[serde(default)]
    pub keys: KeyDimensions,
}

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripParams {
    #[arg(long, default_value_t = DEFAULT_KEY_COUNT)]
    pub key_count: usize,
    #[arg(long, default_value_t = DEFAULT_LEDS_PER_METER)]
    pub leds_per_meter: f64,
    #[arg(long, default_value_t = DEFAULT_LED_COUNT)]
    pub led_count: usize,
    #[arg(long, default_value_t = DEFAULT_START_LED)]
    pub start_led: usize,
    #[arg(long, default_value_t = DEFAULT_END_LED)]
    pub end_led: usize,
    #[arg(long, default_value_t = DEFAULT_LED_WIDTH_MM)]
    pub led_physical_width_mm: f64,
    #[arg(long, default_value_t = DEFAULT_STRIP_CENTER_OFFSET_MM, allow_hyphen_values = true)]
    pub strip_center_offset_mm: f64,
    #[arg(long, default_value_t = DEFAULT_OVERHANG_THRESHOLD_MM)]
    pub overhang_threshold_mm: f64,
    #[arg(long, value_enum, default_value_t = AllocationMode::Sharing)]
    pub allocation_mode: AllocationMode,
}

impl Default for StripParams {
    fn default() -> Self {
        Self {
            key_count: DEFAULT_KEY_COUNT,
            leds_per_meter: DEFAULT_LEDS_PER_METER,
            led_count: DEFAULT_LED_COUNT,
            start_led: DEFAULT_START_LED,
            end_led: DEFAULT_END_LED,
            led_physical_width_mm: DEFAULT_LED_WIDTH_MM,
            strip_center_offset_mm: DEFAULT_STRIP_CENTER_OFFSET_MM,
            overhang_threshold_mm: DEFAULT_OVERHANG_THRESHOLD_MM,
            allocation_mode: AllocationMode::Sharing,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDimensions {
    #[arg(long, default_value_t = DEFAULT_WHITE_KEY_WIDTH_MM)]
    pub white_key_width_mm: f64,
    #[arg(long, default_value_t = DEFAULT_BLACK_KEY_WIDTH_MM)]
    pub black_key_width_mm: f64,
    #[arg(long, default_value_t = DEFAULT_WHITE_KEY_GAP_MM)]
    pub white_key_gap_mm: f64,
}

impl Default for KeyDimensions {
    fn default() -> Self {
        Self {
            white_key_width_mm: DEFAULT_WHITE_KEY_WIDTH_MM,
            black_key_width_mm: DEFAULT_BLACK_KEY_WIDTH_MM,
            white_key_gap_mm: DEFAULT_WHITE_KEY_GAP_MM,
        }
    }
}

impl StripParams {
    /// Nominal center-to-center spacing.
    #[inline]
    pub fn pitch_mm(&self) -> f64 {
        1000.0 / self.leds_per_meter
    }

    /// Number of LEDs in `start_led..=end_led`.
    pub fn active_led_count(&self) -> usize {
        self.end_led.saturating_sub(self.start_led) + 1
    }

    pub fn validate(&self) -> LfResult<()> {
        KeyboardSize::from_key_count(self.key_count)?;

        if self.led_count == 0 {
            return Err(LedForgeError::InvalidLedCount(self.led_count));
        }
        if self.start_led > self.end_led {
            return Err(LedForgeError::InvalidLedRange {
                start: self.start_led,
                end: self.end_led,
            });
        }
        if self.end_led >= self.led_count {
            return Err(LedForgeError::Config(format!(
                "end_led {} is outside a strip of {} LEDs",
                self.end_led, self.led_count
            )));
        }

        let pitch = self.pitch_mm();
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(LedForgeError::InvalidPitch(pitch));
        }

        if !(self.led_physical_width_mm.is_finite() && self.led_physical_width_mm > 0.0) {
            return Err(LedForgeError::Config(format!(
                "led_physical_width_mm must be positive, got {}",
                self.led_physical_width_mm
            )));
        }
        if !(self.overhang_threshold_mm.is_finite() && self.overhang_threshold_mm >= 0.0) {
            return Err(LedForgeError::Config(format!(
                "overhang_threshold_mm must be non-negative, got {}",
                self.overhang_threshold_mm
            )));
        }
        if !self.strip_center_offset_mm.is_finite() {
            return Err(LedForgeError::Config(
                "strip_center_offset_mm must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyDimensions {
    pub fn validate(&self) -> LfResult<()> {
        let dims = [
            ("white_key_width_mm", self.white_key_width_mm),
            ("black_key_width_mm", self.black_key_width_mm),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(LedForgeError::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.white_key_gap_mm.is_finite() && self.white_key_gap_mm >= 0.0) {
            return Err(LedForgeError::Config(format!(
                "white_key_gap_mm must be non-negative, got {}",
                self.white_key_gap_mm
            )));
        }
        Ok(())
    }
}

impl MappingConfig {
    pub fn validate(&self) -> LfResult<()> {
        self.strip.validate()?;
        self.keys.validate()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overlays only the flags the user actually typed onto a file-based config.
    pub fn merge_from_cli(&mut self, cli: &MappingConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(strip.key_count);
        update_if_present!(strip.leds_per_meter);
        update_if_present!(strip.led_count);
        update_if_present!(strip.start_led);
        update_if_present!(strip.end_led);
        update_if_present!(strip.led_physical_width_mm);
        update_if_present!(strip.strip_center_offset_mm);
        update_if_present!(strip.overhang_threshold_mm);
        update_if_present!(strip.allocation_mode);

        update_if_present!(keys.white_key_width_mm);
        update_if_present!(keys.black_key_width_mm);
        update_if_present!(keys.white_key_gap_mm);
    }
}
