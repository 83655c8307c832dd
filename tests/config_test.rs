use clap::{CommandFactory, FromArgMatches, Parser};
use ledforge::allocator::AllocationMode;
use ledforge::calibration::CalibrationState;
use ledforge::config::MappingConfig;
use ledforge::error::LedForgeError;
use std::fs;
use tempfile::TempDir;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    config: MappingConfig,
}

fn write_file(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("Failed to write temp file");
    path
}

#[test]
fn test_defaults() {
    let config = MappingConfig::default();
    assert_eq!(config.strip.key_count, 88);
    assert_eq!(config.strip.leds_per_meter, 200.0);
    assert_eq!(config.strip.led_count, 255);
    assert_eq!(config.strip.start_led, 4);
    assert_eq!(config.strip.end_led, 249);
    assert_eq!(config.strip.led_physical_width_mm, 2.0);
    assert_eq!(config.strip.overhang_threshold_mm, 1.5);
    assert_eq!(config.strip.allocation_mode, AllocationMode::Sharing);
    assert_eq!(config.strip.pitch_mm(), 5.0);
    assert_eq!(config.strip.active_led_count(), 246);
    assert!(config.validate().is_ok());
}

#[test]
fn test_clap_defaults_match_struct_defaults() {
    let cli = TestCli::parse_from(["test"]);
    assert_eq!(cli.config, MappingConfig::default());
}

#[test]
fn test_partial_json_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "strip.json",
        r#"{ "strip": { "key_count": 61, "start_led": 0, "end_led": 179, "allocation_mode": "exclusive" } }"#,
    );

    let config = MappingConfig::load_from_file(&path).unwrap();
    assert_eq!(config.strip.key_count, 61);
    assert_eq!(config.strip.end_led, 179);
    assert_eq!(config.strip.allocation_mode, AllocationMode::Exclusive);
    assert_eq!(config.strip.leds_per_meter, 200.0);
    assert_eq!(config.keys.white_key_width_mm, 23.5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "broken.json", "{ strip: ");
    assert!(matches!(
        MappingConfig::load_from_file(&path),
        Err(LedForgeError::Json(_))
    ));
    assert!(matches!(
        MappingConfig::load_from_file(dir.path().join("missing.json")),
        Err(LedForgeError::Io(_))
    ));
}

#[test]
fn test_cli_flags_override_file_values() {
    let mut file_config = MappingConfig::default();
    file_config.strip.start_led = 2;
    file_config.strip.end_led = 200;

    let matches = TestCli::command().get_matches_from(["test", "--start-led", "10"]);
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    file_config.merge_from_cli(&cli.config, &matches);

    // Typed flag wins, untouched flag keeps the file value.
    assert_eq!(file_config.strip.start_led, 10);
    assert_eq!(file_config.strip.end_led, 200);
}

#[test]
fn test_negative_center_offset_flag() {
    let cli = TestCli::parse_from(["test", "--strip-center-offset-mm", "-3.5"]);
    assert_eq!(cli.config.strip.strip_center_offset_mm, -3.5);
}

#[test]
fn test_validation_errors() {
    let mut c = MappingConfig::default();
    c.strip.led_count = 0;
    assert!(matches!(c.validate(), Err(LedForgeError::InvalidLedCount(0))));

    let mut c = MappingConfig::default();
    c.strip.leds_per_meter = 0.0;
    assert!(matches!(c.validate(), Err(LedForgeError::InvalidPitch(_))));

    let mut c = MappingConfig::default();
    c.strip.end_led = 255;
    assert!(matches!(c.validate(), Err(LedForgeError::Config(_))));

    let mut c = MappingConfig::default();
    c.strip.overhang_threshold_mm = -0.1;
    assert!(matches!(c.validate(), Err(LedForgeError::Config(_))));

    let mut c = MappingConfig::default();
    c.keys.black_key_width_mm = 0.0;
    let err = c.validate().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("black_key_width_mm"));
}

#[test]
fn test_calibration_snapshot_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "calibration.json",
        r#"{
            "global_offset": -2,
            "key_offsets": { "48": 1, "50": 2 },
            "key_led_trims": { "60": { "left": 1 } },
            "weld_offsets": { "120": 3.5 }
        }"#,
    );

    let cal = CalibrationState::load_from_file(&path).unwrap();
    assert!(cal.enabled);
    assert_eq!(cal.global_offset, -2);
    assert_eq!(cal.effective_offset(50), 1);
    let trim = cal.trim_for(60).unwrap();
    assert_eq!((trim.left, trim.right), (1, 0));
    assert_eq!(cal.weld_shift_mm(119), 0.0);
    assert_eq!(cal.weld_shift_mm(200), 3.5);
}

#[test]
fn test_empty_calibration_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "empty.json", "{}");
    assert_eq!(
        CalibrationState::load_from_file(&path).unwrap(),
        CalibrationState::default()
    );
}

#[test]
fn test_calibration_global_offset_bound() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.json", r#"{ "global_offset": 150 }"#);
    let err = CalibrationState::load_from_file(&path).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("150"));

    assert!(CalibrationState::default()
        .with_global_offset(-100)
        .validate()
        .is_ok());
    assert!(CalibrationState::default()
        .with_global_offset(i32::MIN)
        .validate()
        .unwrap_err()
        .is_configuration());
}
