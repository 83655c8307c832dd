use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use strum_macros::Display;

/// How an LED ended up in a key's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Passed the overhang threshold.
    Standard,
    /// Orphan reassigned by distance.
    Rescued,
    /// Added to cover the head or tail of the strip.
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedEntry {
    pub led: usize,
    pub kind: EntryKind,
}

impl LedEntry {
    pub fn new(led: usize, kind: EntryKind) -> Self {
        Self { led, kind }
    }
}

/// Base key -> LED assignment, indexed by key position. Sequences stay ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct KeyLedAssignment {
    sequences: Vec<Vec<LedEntry>>,
}

impl KeyLedAssignment {
    pub fn new(key_count: usize) -> Self {
        Self {
            sequences: vec![Vec::new(); key_count],
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequence(&self, key: usize) -> &[LedEntry] {
        self.sequences.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn indices(&self, key: usize) -> Vec<usize> {
        self.sequence(key).iter().map(|e| e.led).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[LedEntry]> {
        self.sequences.iter().map(Vec::as_slice)
    }

    pub fn first_led(&self, key: usize) -> Option<usize> {
        self.sequence(key).first().map(|e| e.led)
    }

    pub fn last_led(&self, key: usize) -> Option<usize> {
        self.sequence(key).last().map(|e| e.led)
    }

    pub fn contains(&self, key: usize, led: usize) -> bool {
        self.sequence(key).iter().any(|e| e.led == led)
    }

    /// Inserts keeping ascending order; an index already present is left alone.
    pub fn insert(&mut self, key: usize, entry: LedEntry) {
        let Some(seq) = self.sequences.get_mut(key) else {
            return;
        };
        if let Err(pos) = seq.binary_search_by_key(&entry.led, |e| e.led) {
            seq.insert(pos, entry);
        }
    }

    pub fn empty_keys(&self) -> Vec<usize> {
        self.sequences
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn min_led(&self) -> Option<usize> {
        self.sequences.iter().filter_map(|s| s.first()).map(|e| e.led).min()
    }

    pub fn max_led(&self) -> Option<usize> {
        self.sequences.iter().filter_map(|s| s.last()).map(|e| e.led).max()
    }

    pub fn total_entries(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    pub fn unique_leds(&self) -> BTreeSet<usize> {
        self.sequences.iter().flatten().map(|e| e.led).collect()
    }

    pub fn count_kind(&self, kind: EntryKind) -> usize {
        self.sequences
            .iter()
            .flatten()
            .filter(|e| e.kind == kind)
            .count()
    }

    /// Indices of `start..=end` that no key holds.
    pub fn uncovered(&self, start: usize, end: usize) -> Vec<usize> {
        let used = self.unique_leds();
        (start..=end).filter(|i| !used.contains(i)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    pub key_index: usize,
    pub note_number: u8,
    pub leds: Vec<usize>,
}

/// The key -> LED mapping handed to the lighting layer. Built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinalMapping {
    keys: Vec<KeyMapping>,
}

impl FinalMapping {
    pub fn new(keys: Vec<KeyMapping>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[KeyMapping] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, key_index: usize) -> Option<&KeyMapping> {
        self.keys.get(key_index)
    }

    pub fn leds_for_key(&self, key_index: usize) -> &[usize] {
        self.keys
            .get(key_index)
            .map(|k| k.leds.as_slice())
            .unwrap_or(&[])
    }

    pub fn leds_for_note(&self, note_number: u8) -> Option<&[usize]> {
        self.keys
            .iter()
            .find(|k| k.note_number == note_number)
            .map(|k| k.leds.as_slice())
    }

    pub fn total_entries(&self) -> usize {
        self.keys.iter().map(|k| k.leds.len()).sum()
    }

    pub fn unique_leds(&self) -> BTreeSet<usize> {
        self.keys.iter().flat_map(|k| k.leds.iter().copied()).collect()
    }

    /// Entries beyond the first occurrence of each LED.
    pub fn shared_entries(&self) -> usize {
        self.total_entries() - self.unique_leds().len()
    }

    /// One row per key: `key_index,note_number,leds` with LEDs space separated.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> crate::error::LfResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["key_index", "note_number", "leds"])?;
        for k in &self.keys {
            let leds = k
                .leds
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            wtr.write_record([k.key_index.to_string(), k.note_number.to_string(), leds])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Non-fatal conditions collected during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingWarning {
    RangeClamp {
        note_number: u8,
        requested: i64,
        clamped: usize,
    },
    EmptyTrim {
        note_number: u8,
        left: usize,
        right: usize,
        available: usize,
    },
    CoverageShortfall {
        max_led_assigned: Option<usize>,
        end_led: usize,
        empty_keys: usize,
    },
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RangeClamp {
                note_number,
                requested,
                clamped,
            } => write!(
                f,
                "note {}: LED index {} out of range, clamped to {}",
                note_number, requested, clamped
            ),
            Self::EmptyTrim {
                note_number,
                left,
                right,
                available,
            } => write!(
                f,
                "note {}: trim {}+{} would empty its {} LEDs, trim skipped",
                note_number, left, right, available
            ),
            Self::CoverageShortfall {
                max_led_assigned,
                end_led,
                empty_keys,
            } => match max_led_assigned {
                Some(max) => write!(
                    f,
                    "degraded coverage: last LED reached {} of {}, {} key(s) without LEDs",
                    max, end_led, empty_keys
                ),
                None => write!(
                    f,
                    "degraded coverage: no LED passed the overhang threshold ({} key(s) without LEDs)",
                    empty_keys
                ),
            },
        }
    }
}
