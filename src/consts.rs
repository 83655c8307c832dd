/// Default width of a white key's top surface.
pub const DEFAULT_WHITE_KEY_WIDTH_MM: f64 = 23.5;

/// Default width of a black key.
pub const DEFAULT_BLACK_KEY_WIDTH_MM: f64 = 13.7;

/// Default gap between two neighbouring white keys.
pub const DEFAULT_WHITE_KEY_GAP_MM: f64 = 1.0;

pub const DEFAULT_KEY_COUNT: usize = 88;
pub const DEFAULT_LEDS_PER_METER: f64 = 200.0;
pub const DEFAULT_LED_COUNT: usize = 255;
pub const DEFAULT_START_LED: usize = 4;
pub const DEFAULT_END_LED: usize = 249;

/// Footprint of a single emitter along the strip (2020 package).
pub const DEFAULT_LED_WIDTH_MM: f64 = 2.0;
pub const DEFAULT_STRIP_CENTER_OFFSET_MM: f64 = 0.0;
pub const DEFAULT_OVERHANG_THRESHOLD_MM: f64 = 1.5;

/// Global offset is stored as a signed LED count within +/- this bound.
pub const GLOBAL_OFFSET_LIMIT: i32 = 100;

/// Pitch classes (C = 0) that are black keys.
pub const BLACK_PITCH_CLASSES: [u8; 5] = [1, 3, 6, 8, 10];

/// Two pitches closer than this are treated as identical by the cascade.
pub const PITCH_EPSILON_MM: f64 = 1e-9;
