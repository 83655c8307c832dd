#![allow(dead_code)]

use ledforge::allocator::AllocationMode;
use ledforge::config::{MappingConfig, StripParams};
use ledforge::geometry::leds::LedStrip;
use ledforge::geometry::{KeyboardGeometry, KeyboardSize};

/// 88 keys, 200 LEDs/m, active range 4..=249, everything else default.
pub fn scenario_config(mode: AllocationMode) -> MappingConfig {
    MappingConfig {
        strip: StripParams {
            allocation_mode: mode,
            ..StripParams::default()
        },
        ..MappingConfig::default()
    }
}

/// 25 keys on a strip that already fits at nominal pitch.
pub fn small_config() -> MappingConfig {
    MappingConfig {
        strip: StripParams {
            key_count: 25,
            led_count: 80,
            start_led: 0,
            end_led: 72,
            ..StripParams::default()
        },
        ..MappingConfig::default()
    }
}

pub fn geometry_88() -> KeyboardGeometry {
    KeyboardGeometry::standard(KeyboardSize::Keys88)
}

pub fn strip_from(config: &MappingConfig) -> LedStrip {
    LedStrip::from_params(&config.strip)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
