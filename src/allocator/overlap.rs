use super::AllocationMode;
use crate::geometry::leds::{LedPlacement, LedStrip};
use crate::geometry::{KeyboardGeometry, PianoKey};
use crate::mapping::{EntryKind, KeyLedAssignment, LedEntry};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub mapping: KeyLedAssignment,
    /// Highest LED that passed the threshold (before edge extension).
    pub max_led_assigned: Option<usize>,
}

/// Assigns LEDs to keys by footprint overlap, rejecting any LED that
/// overhangs a key's exposed edge by more than the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapAllocator {
    pub mode: AllocationMode,
    pub overhang_threshold_mm: f64,
}

impl OverlapAllocator {
    pub fn new(mode: AllocationMode, overhang_threshold_mm: f64) -> Self {
        Self {
            mode,
            overhang_threshold_mm,
        }
    }

    /// Binary acceptance: intersects, and neither side overhangs past the threshold.
    #[inline]
    pub fn accepts(&self, key: &PianoKey, led: &LedPlacement) -> bool {
        led.intersects(key)
            && led.overhang_left(key) <= self.overhang_threshold_mm
            && led.overhang_right(key) <= self.overhang_threshold_mm
    }

    pub fn allocate(&self, geometry: &KeyboardGeometry, strip: &LedStrip) -> AllocationOutcome {
        let placements = strip.placements();
        let mut mapping = KeyLedAssignment::new(geometry.len());
        let mut owned = vec![false; placements.len()];
        let mut max_led_assigned: Option<usize> = None;

        for key in &geometry.keys {
            // Placements are ordered by position; skip everything left of the key.
            let first = placements.partition_point(|l| l.end_mm <= key.exposed_start_mm);

            for (slot, led) in placements.iter().enumerate().skip(first) {
                if led.start_mm >= key.exposed_end_mm {
                    break;
                }
                if !self.accepts(key, led) {
                    continue;
                }
                if !self.mode.allows_sharing() && owned[slot] {
                    continue;
                }

                owned[slot] = true;
                mapping.insert(
                    key.index,
                    LedEntry::new(led.absolute_index, EntryKind::Standard),
                );
                max_led_assigned = max_led_assigned.max(Some(led.absolute_index));
            }
        }

        extend_edges(&mut mapping, strip, max_led_assigned);

        debug!(
            "Overlap pass ({}): pitch {:.4} mm, {} entries, max LED {:?}, {} empty key(s)",
            self.mode,
            strip.pitch_mm(),
            mapping.total_entries(),
            max_led_assigned,
            mapping.empty_keys().len()
        );

        AllocationOutcome {
            mapping,
            max_led_assigned,
        }
    }
}

/// Covers the strip head with the first key and the tail with the last key.
fn extend_edges(mapping: &mut KeyLedAssignment, strip: &LedStrip, max_led: Option<usize>) {
    let (start, end) = (strip.start_led(), strip.end_led());
    let Some(last_key) = mapping.len().checked_sub(1) else {
        return;
    };

    let head_limit = mapping
        .first_led(0)
        .or_else(|| mapping.min_led())
        .unwrap_or(end + 1);
    for led in start..head_limit {
        mapping.insert(0, LedEntry::new(led, EntryKind::Extended));
    }

    let tail_from = mapping
        .last_led(last_key)
        .or(max_led)
        .map(|hi| hi + 1)
        .unwrap_or(start);
    for led in tail_from..=end {
        mapping.insert(last_key, LedEntry::new(led, EntryKind::Extended));
    }
}
