pub mod leds;

use crate::config::KeyDimensions;
use crate::consts::BLACK_PITCH_CLASSES;
use crate::error::{LedForgeError, LfResult};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    White,
    Black,
}

/// The keyboard sizes we know how to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum KeyboardSize {
    #[strum(to_string = "25-key")]
    Keys25,
    #[strum(to_string = "37-key")]
    Keys37,
    #[strum(to_string = "49-key")]
    Keys49,
    #[strum(to_string = "61-key")]
    Keys61,
    #[strum(to_string = "76-key")]
    Keys76,
    #[strum(to_string = "88-key")]
    Keys88,
}

impl KeyboardSize {
    pub fn from_key_count(key_count: usize) -> LfResult<Self> {
        match key_count {
            25 => Ok(Self::Keys25),
            37 => Ok(Self::Keys37),
            49 => Ok(Self::Keys49),
            61 => Ok(Self::Keys61),
            76 => Ok(Self::Keys76),
            88 => Ok(Self::Keys88),
            other => Err(LedForgeError::UnsupportedKeyCount(other)),
        }
    }

    pub fn key_count(&self) -> usize {
        match self {
            Self::Keys25 => 25,
            Self::Keys37 => 37,
            Self::Keys49 => 49,
            Self::Keys61 => 61,
            Self::Keys76 => 76,
            Self::Keys88 => 88,
        }
    }

    /// MIDI note number of the leftmost key.
    pub fn lowest_note(&self) -> u8 {
        match self {
            Self::Keys25 | Self::Keys37 => 48, // C3
            Self::Keys49 | Self::Keys61 => 36, // C2
            Self::Keys76 => 28,                // E1
            Self::Keys88 => 21,                // A0
        }
    }

    pub fn highest_note(&self) -> u8 {
        self.lowest_note() + (self.key_count() - 1) as u8
    }
}

pub fn is_black_note(note_number: u8) -> bool {
    BLACK_PITCH_CLASSES.contains(&(note_number % 12))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PianoKey {
    pub index: usize,
    pub note_number: u8,
    pub key_type: KeyType,
    pub center_mm: f64,
    pub width_mm: f64,
    /// Visible top interval tested against LED footprints.
    pub exposed_start_mm: f64,
    pub exposed_end_mm: f64,
}

impl PianoKey {
    #[inline]
    pub fn exposed_width_mm(&self) -> f64 {
        self.exposed_end_mm - self.exposed_start_mm
    }

    #[inline]
    pub fn exposed_center_mm(&self) -> f64 {
        (self.exposed_start_mm + self.exposed_end_mm) * 0.5
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.key_type == KeyType::Black
    }

    /// Distance from a point to the exposed interval (0 when inside).
    pub fn distance_to_exposed(&self, x_mm: f64) -> f64 {
        if x_mm < self.exposed_start_mm {
            self.exposed_start_mm - x_mm
        } else if x_mm > self.exposed_end_mm {
            x_mm - self.exposed_end_mm
        } else {
            0.0
        }
    }
}

/// Ordered key list. Neighbours are found by index, never by reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardGeometry {
    pub size: KeyboardSize,
    pub keys: Vec<PianoKey>,
}

impl KeyboardGeometry {
    pub fn standard(size: KeyboardSize) -> Self {
        Self::build(size, &KeyDimensions::default())
    }

    pub fn from_key_count(key_count: usize, dims: &KeyDimensions) -> LfResult<Self> {
        let size = KeyboardSize::from_key_count(key_count)?;
        Ok(Self::build(size, dims))
    }

    pub fn build(size: KeyboardSize, dims: &KeyDimensions) -> Self {
        let white_w = dims.white_key_width_mm;
        let black_w = dims.black_key_width_mm;
        let gap = dims.white_key_gap_mm;
        let white_step = white_w + gap;

        // 1. Physical top surfaces. Whites are uniform, blacks sit centered
        // on the gap between the two whites around them.
        let first_note = size.lowest_note();
        let mut surfaces: Vec<(u8, KeyType, f64, f64)> = Vec::with_capacity(size.key_count());
        let mut whites_placed = 0usize;

        for offset in 0..size.key_count() {
            let note = first_note + offset as u8;
            if is_black_note(note) {
                let center = whites_placed as f64 * white_step - gap * 0.5;
                let half = black_w * 0.5;
                surfaces.push((note, KeyType::Black, center - half, center + half));
            } else {
                let start = whites_placed as f64 * white_step;
                surfaces.push((note, KeyType::White, start, start + white_w));
                whites_placed += 1;
            }
        }

        // 2. Exposed surfaces. A white key loses whatever its black
        // neighbours cover; a missing neighbour simply contributes nothing.
        let mut keys = Vec::with_capacity(surfaces.len());
        for (i, &(note, key_type, start, end)) in surfaces.iter().enumerate() {
            let (mut exposed_start, mut exposed_end) = (start, end);

            if key_type == KeyType::White {
                if let Some(&(_, KeyType::Black, _, prev_end)) =
                    i.checked_sub(1).and_then(|p| surfaces.get(p))
                {
                    exposed_start = exposed_start.max(prev_end);
                }
                if let Some(&(_, KeyType::Black, next_start, _)) = surfaces.get(i + 1) {
                    exposed_end = exposed_end.min(next_start);
                }
            }

            keys.push(PianoKey {
                index: i,
                note_number: note,
                key_type,
                center_mm: (start + end) * 0.5,
                width_mm: end - start,
                exposed_start_mm: exposed_start,
                exposed_end_mm: exposed_end,
            });
        }

        debug!(
            "Geometry: {} ({} keys, {} white), span {:.1} mm",
            size,
            keys.len(),
            whites_placed,
            keys.last().map(|k| k.exposed_end_mm).unwrap_or(0.0)
        );

        Self { size, keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, index: usize) -> Option<&PianoKey> {
        self.keys.get(index)
    }

    pub fn key_by_note(&self, note_number: u8) -> Option<&PianoKey> {
        let lowest = self.keys.first()?.note_number;
        let idx = note_number.checked_sub(lowest)? as usize;
        self.keys.get(idx)
    }

    /// (left, right) neighbours of a key.
    pub fn neighbors(&self, index: usize) -> (Option<&PianoKey>, Option<&PianoKey>) {
        let left = index.checked_sub(1).and_then(|i| self.keys.get(i));
        (left, self.keys.get(index + 1))
    }

    /// Physical distance covered by the exposed surfaces, first edge to last edge.
    pub fn span_mm(&self) -> f64 {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => last.exposed_end_mm - first.exposed_start_mm,
            _ => 0.0,
        }
    }
}
