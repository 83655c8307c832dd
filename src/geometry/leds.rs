use crate::config::StripParams;
use crate::geometry::PianoKey;
use serde::{Deserialize, Serialize};

/// Physical footprint of one LED along the keyboard axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedPlacement {
    pub absolute_index: usize,
    pub center_mm: f64,
    pub start_mm: f64,
    pub end_mm: f64,
}

impl LedPlacement {
    #[inline]
    pub fn width_mm(&self) -> f64 {
        self.end_mm - self.start_mm
    }

    /// Open-interval test: touching edges do not count as overlap.
    #[inline]
    pub fn intersects(&self, key: &PianoKey) -> bool {
        self.end_mm > key.exposed_start_mm && self.start_mm < key.exposed_end_mm
    }

    #[inline]
    pub fn overhang_left(&self, key: &PianoKey) -> f64 {
        (key.exposed_start_mm - self.start_mm).max(0.0)
    }

    #[inline]
    pub fn overhang_right(&self, key: &PianoKey) -> f64 {
        (self.end_mm - key.exposed_end_mm).max(0.0)
    }

    /// Length of the footprint that lies on the key's exposed surface.
    pub fn coverage_mm(&self, key: &PianoKey) -> f64 {
        let lo = self.start_mm.max(key.exposed_start_mm);
        let hi = self.end_mm.min(key.exposed_end_mm);
        (hi - lo).max(0.0)
    }
}

/// The active LED range `start_led..=end_led` laid out at a given pitch.
///
/// LED `start_led + r` is centered at `r * pitch + center_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct LedStrip {
    pitch_mm: f64,
    led_width_mm: f64,
    center_offset_mm: f64,
    start_led: usize,
    end_led: usize,
    placements: Vec<LedPlacement>,
}

impl LedStrip {
    pub fn new(
        pitch_mm: f64,
        led_width_mm: f64,
        center_offset_mm: f64,
        start_led: usize,
        end_led: usize,
    ) -> Self {
        let placements = (start_led..=end_led)
            .map(|abs| place(abs, start_led, pitch_mm, led_width_mm, center_offset_mm))
            .collect();

        Self {
            pitch_mm,
            led_width_mm,
            center_offset_mm,
            start_led,
            end_led,
            placements,
        }
    }

    /// Strip at the nominal pitch derived from LED density.
    pub fn from_params(params: &StripParams) -> Self {
        Self::new(
            params.pitch_mm(),
            params.led_physical_width_mm,
            params.strip_center_offset_mm,
            params.start_led,
            params.end_led,
        )
    }

    /// Same strip, re-laid at another pitch.
    pub fn with_pitch(&self, pitch_mm: f64) -> Self {
        Self::new(
            pitch_mm,
            self.led_width_mm,
            self.center_offset_mm,
            self.start_led,
            self.end_led,
        )
    }

    pub fn pitch_mm(&self) -> f64 {
        self.pitch_mm
    }

    pub fn led_width_mm(&self) -> f64 {
        self.led_width_mm
    }

    pub fn center_offset_mm(&self) -> f64 {
        self.center_offset_mm
    }

    pub fn start_led(&self) -> usize {
        self.start_led
    }

    pub fn end_led(&self) -> usize {
        self.end_led
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn placements(&self) -> &[LedPlacement] {
        &self.placements
    }

    /// Placement of an index inside the active range.
    pub fn get(&self, absolute_index: usize) -> Option<&LedPlacement> {
        absolute_index
            .checked_sub(self.start_led)
            .and_then(|r| self.placements.get(r))
    }

    /// Placement of any index, including ones outside the active range
    /// (calibration offsets can move a key there).
    pub fn placement_of(&self, absolute_index: usize) -> LedPlacement {
        match self.get(absolute_index) {
            Some(p) => *p,
            None => place(
                absolute_index,
                self.start_led,
                self.pitch_mm,
                self.led_width_mm,
                self.center_offset_mm,
            ),
        }
    }
}

fn place(abs: usize, start_led: usize, pitch: f64, width: f64, offset: f64) -> LedPlacement {
    let relative = abs as f64 - start_led as f64;
    let center = relative * pitch + offset;
    let half = width * 0.5;
    LedPlacement {
        absolute_index: abs,
        center_mm: center,
        start_mm: center - half,
        end_mm: center + half,
    }
}
