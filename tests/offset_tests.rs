use ledforge::allocator::AllocationMode;
use ledforge::api::{compute_base, compute_mapping};
use ledforge::calibration::CalibrationState;
use ledforge::mapping::MappingWarning;
use ledforge::offsets::CalibrationOffsetProcessor;
use rstest::rstest;

mod common;
use common::scenario_config;

fn cascading_law() -> CalibrationState {
    CalibrationState::default()
        .with_key_offset(48, 1)
        .with_key_offset(50, 2)
        .with_key_offset(55, 3)
}

#[rstest]
#[case(47, 0)]
#[case(48, 1)]
#[case(49, 1)]
#[case(50, 3)]
#[case(54, 3)]
#[case(55, 6)]
#[case(60, 6)]
#[case(108, 6)]
fn test_effective_offset_cascades(#[case] note: u8, #[case] expected: i64) {
    assert_eq!(cascading_law().effective_offset(note), expected);
}

#[test]
fn test_global_offset_adds_to_cascade() {
    let cal = cascading_law().with_global_offset(-2);
    assert_eq!(cal.effective_offset(21), -2);
    assert_eq!(cal.effective_offset(60), 4);
}

#[test]
fn test_cascading_offset_shifts_mapping() {
    // Room past end_led so the +6 tail is not clamped.
    let mut config = scenario_config(AllocationMode::Sharing);
    config.strip.led_count = 300;
    let cal = cascading_law();
    let (geom, base) = compute_base(&config).unwrap();
    let result = CalibrationOffsetProcessor::new(&cal, config.strip.led_count, base.strip.pitch_mm())
        .apply(&geom, &base.mapping);

    for key in &geom.keys {
        let shift = cal.effective_offset(key.note_number) as usize;
        let expected: Vec<usize> = base
            .mapping
            .indices(key.index)
            .iter()
            .map(|i| i + shift)
            .collect();
        assert_eq!(result.mapping.leds_for_key(key.index), expected.as_slice());
    }
    assert!(result.warnings.is_empty());
}

#[test]
fn test_negative_offset_clamps_at_zero() {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_global_offset(-10);
    let run = compute_mapping(&config, &cal).unwrap();

    // Key 0 holds LEDs 4..=7 before calibration; all of them land below 0.
    assert_eq!(run.mapping.leds_for_key(0), &[0]);
    assert_eq!(
        run.warnings[0],
        MappingWarning::RangeClamp {
            note_number: 21,
            requested: -6,
            clamped: 0,
        }
    );
    // One warning per key, however many of its LEDs were clamped.
    let key0_clamps = run
        .warnings
        .iter()
        .filter(|w| matches!(w, MappingWarning::RangeClamp { note_number: 21, .. }))
        .count();
    assert_eq!(key0_clamps, 1);
}

#[test]
fn test_positive_offset_clamps_at_strip_end() {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_global_offset(10);
    let run = compute_mapping(&config, &cal).unwrap();

    let last = run.mapping.leds_for_key(87);
    assert_eq!(last, &[254]);
    assert!(run
        .warnings
        .iter()
        .any(|w| matches!(w, MappingWarning::RangeClamp { note_number: 108, clamped: 254, .. })));
    for key in run.mapping.keys() {
        assert!(key.leds.iter().all(|&i| i < config.strip.led_count));
    }
}

#[rstest]
#[case(1, 1, vec![5, 6])]
#[case(0, 3, vec![4])]
#[case(3, 0, vec![7])]
fn test_trim_drops_leds_from_the_ends(
    #[case] left: usize,
    #[case] right: usize,
    #[case] expected: Vec<usize>,
) {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_trim(21, left, right);
    let run = compute_mapping(&config, &cal).unwrap();
    assert_eq!(run.mapping.leds_for_key(0), expected.as_slice());
    assert!(run.warnings.is_empty());
}

#[test]
fn test_trim_that_would_empty_a_key_is_skipped() {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_trim(21, 2, 2);
    let run = compute_mapping(&config, &cal).unwrap();

    assert_eq!(run.mapping.leds_for_key(0), &[4, 5, 6, 7]);
    assert_eq!(
        run.warnings,
        vec![MappingWarning::EmptyTrim {
            note_number: 21,
            left: 2,
            right: 2,
            available: 4,
        }]
    );
}

#[test]
fn test_weld_shifts_leds_past_the_splice() {
    let config = scenario_config(AllocationMode::Sharing);
    // Just over one calibrated pitch: rounds to a single LED step.
    let cal = CalibrationState::default().with_weld(100, 5.2);
    let run = compute_mapping(&config, &cal).unwrap();

    for key in &run.geometry.keys {
        let mut expected: Vec<usize> = run
            .base
            .indices(key.index)
            .iter()
            .map(|&i| if i >= 100 { i - 1 } else { i })
            .collect();
        expected.dedup();
        assert_eq!(run.mapping.leds_for_key(key.index), expected.as_slice());
    }
}

#[test]
fn test_small_weld_rounds_to_nothing() {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_weld(100, 1.0).with_weld(150, 1.0);
    let run = compute_mapping(&config, &cal).unwrap();
    for key in &run.geometry.keys {
        // 1 mm before 150, 2 mm after: both round to zero LEDs.
        assert_eq!(
            run.mapping.leds_for_key(key.index),
            run.base.indices(key.index).as_slice()
        );
    }
}

#[test]
fn test_disabled_calibration_passes_base_through() {
    let config = scenario_config(AllocationMode::Sharing);
    let mut cal = cascading_law().with_global_offset(7).with_trim(21, 1, 1);
    cal.enabled = false;
    let run = compute_mapping(&config, &cal).unwrap();

    for key in &run.geometry.keys {
        assert_eq!(
            run.mapping.leds_for_key(key.index),
            run.base.indices(key.index).as_slice()
        );
    }
    assert!(run.warnings.is_empty());
}

#[test]
fn test_offsets_are_idempotent() {
    let config = scenario_config(AllocationMode::Exclusive);
    let cal = cascading_law()
        .with_global_offset(-3)
        .with_trim(60, 1, 0)
        .with_weld(120, -4.0);

    let first = compute_mapping(&config, &cal).unwrap();
    let second = compute_mapping(&config, &cal).unwrap();
    assert_eq!(first.mapping, second.mapping);
    assert_eq!(first.warnings, second.warnings);
    assert_eq!(
        serde_json::to_string(&first.mapping).unwrap(),
        serde_json::to_string(&second.mapping).unwrap()
    );
}

#[test]
fn test_recalibrate_matches_fresh_run() {
    let config = scenario_config(AllocationMode::Sharing);
    let plain = compute_mapping(&config, &CalibrationState::default()).unwrap();

    let cal = cascading_law().with_trim(72, 1, 0);
    let fresh = compute_mapping(&config, &cal).unwrap();
    let reapplied = plain.recalibrate(&config, &cal).unwrap();
    assert_eq!(reapplied.mapping, fresh.mapping);
    assert_eq!(reapplied.warnings, fresh.warnings);
}

#[test]
fn test_out_of_range_global_offset_is_rejected() {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_global_offset(101);
    let err = compute_mapping(&config, &cal).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_oversized_trim_is_skipped_not_fatal() {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_trim(21, usize::MAX, 1);
    let run = compute_mapping(&config, &cal).unwrap();

    assert_eq!(run.mapping.leds_for_key(0), &[4, 5, 6, 7]);
    assert_eq!(
        run.warnings,
        vec![MappingWarning::EmptyTrim {
            note_number: 21,
            left: usize::MAX,
            right: 1,
            available: 4,
        }]
    );
}

#[test]
fn test_oversized_trim_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibration.json");
    std::fs::write(
        &path,
        r#"{"key_led_trims":{"60":{"left":18446744073709551615,"right":1}}}"#,
    )
    .unwrap();
    let cal = CalibrationState::load_from_file(&path).unwrap();

    let run = compute_mapping(&scenario_config(AllocationMode::Sharing), &cal).unwrap();
    assert!(matches!(
        run.warnings.as_slice(),
        [MappingWarning::EmptyTrim { note_number: 60, .. }]
    ));
    assert_eq!(run.mapping.leds_for_note(60), Some(&[113usize, 114, 115][..]));
}

#[rstest]
#[case(-1e300, 254)]
#[case(1e300, 0)]
fn test_extreme_weld_clamps_to_strip(#[case] weld_mm: f64, #[case] clamped: usize) {
    let config = scenario_config(AllocationMode::Sharing);
    let cal = CalibrationState::default().with_weld(10, weld_mm);
    let run = compute_mapping(&config, &cal).unwrap();

    // LEDs before the splice are untouched.
    assert_eq!(run.mapping.leds_for_key(0), &[4, 5, 6, 7]);
    assert_eq!(run.mapping.leds_for_key(87), &[clamped]);
    assert!(run
        .warnings
        .iter()
        .any(|w| matches!(w, MappingWarning::RangeClamp { note_number: 108, .. })));
}

#[test]
fn test_extreme_key_offsets_do_not_overflow() {
    let cal = CalibrationState::default()
        .with_global_offset(100)
        .with_key_offset(21, i32::MAX)
        .with_key_offset(22, 1);
    assert_eq!(cal.effective_offset(21), i64::from(i32::MAX) + 100);
    assert_eq!(cal.effective_offset(22), i64::from(i32::MAX) + 101);

    let run = compute_mapping(&scenario_config(AllocationMode::Sharing), &cal).unwrap();
    for key in run.mapping.keys() {
        assert_eq!(key.leds, vec![254]);
    }

    let cal = CalibrationState::default()
        .with_key_offset(21, i32::MIN)
        .with_key_offset(30, i32::MIN);
    let run = compute_mapping(&scenario_config(AllocationMode::Sharing), &cal).unwrap();
    assert!(run.mapping.keys().iter().all(|k| k.leds == vec![0]));
}
