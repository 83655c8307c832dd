pub mod cascade;
pub mod overlap;
pub mod rescue;

pub use self::cascade::{CascadeOutcome, PitchCalibrationCascade, PitchCalibrationResult};
pub use self::overlap::{AllocationOutcome, OverlapAllocator};
pub use self::rescue::GapRescueResolver;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Whether a boundary LED may belong to two keys or exactly one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// Keep an LED in every key whose threshold it satisfies.
    #[default]
    Sharing,
    /// First key (ascending) that accepts an LED owns it.
    Exclusive,
}

impl AllocationMode {
    #[inline]
    pub fn allows_sharing(self) -> bool {
        matches!(self, Self::Sharing)
    }
}
