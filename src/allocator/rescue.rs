use crate::geometry::leds::LedStrip;
use crate::geometry::KeyboardGeometry;
use crate::mapping::{EntryKind, KeyLedAssignment, LedEntry};
use tracing::debug;

/// Hands LEDs the threshold filter dropped between two populated keys to
/// whichever key is physically closer.
///
/// For neighbouring keys the distances are measured to the facing edges
/// (left key's exposed end, right key's exposed start). When keys in between
/// received nothing, they compete too, by distance to their exposed surface.
/// Exact ties go to the lower-indexed key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapRescueResolver;

impl GapRescueResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the number of LEDs rescued.
    pub fn resolve(
        &self,
        geometry: &KeyboardGeometry,
        strip: &LedStrip,
        mapping: &mut KeyLedAssignment,
    ) -> usize {
        let populated: Vec<usize> = (0..mapping.len())
            .filter(|&k| !mapping.sequence(k).is_empty())
            .collect();

        let mut rescued = 0;
        for pair in populated.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let (Some(hi), Some(lo)) = (mapping.last_led(left), mapping.first_led(right)) else {
                continue;
            };

            for led_index in (hi + 1)..lo {
                let Some(led) = strip.get(led_index) else {
                    continue;
                };
                let owner = nearest_key(geometry, left, right, led.center_mm);
                mapping.insert(owner, LedEntry::new(led_index, EntryKind::Rescued));
                rescued += 1;
            }
        }

        if rescued > 0 {
            debug!("Gap rescue: {} orphaned LED(s) reassigned", rescued);
        }
        rescued
    }
}

fn nearest_key(geometry: &KeyboardGeometry, left: usize, right: usize, center_mm: f64) -> usize {
    let mut best = left;
    let mut best_dist = f64::INFINITY;

    for k in left..=right {
        let Some(key) = geometry.key(k) else {
            continue;
        };
        let dist = if k == left {
            (center_mm - key.exposed_end_mm).abs()
        } else if k == right {
            (center_mm - key.exposed_start_mm).abs()
        } else {
            key.distance_to_exposed(center_mm)
        };

        if dist < best_dist {
            best = k;
            best_dist = dist;
        }
    }
    best
}
