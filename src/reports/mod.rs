use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use ledforge::allocator::PitchCalibrationResult;
use ledforge::api::MappingRun;
use ledforge::error::LfResult;
use ledforge::geometry::{KeyType, KeyboardSize};
use ledforge::mapping::MappingWarning;
use ledforge::quality::{AggregateQuality, Diagnostics, KeyQuality, QualityGrade};
use strum::IntoEnumIterator;

pub struct SurveyRow {
    pub size: KeyboardSize,
    pub outcome: LfResult<(MappingRun, Diagnostics)>,
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn grade_cell(grade: QualityGrade) -> Cell {
    let cell = Cell::new(grade.to_string());
    match grade {
        QualityGrade::Excellent => cell.fg(Color::Green),
        QualityGrade::Good => cell.fg(Color::Cyan),
        QualityGrade::Fair => cell.fg(Color::Yellow),
        QualityGrade::Poor => cell.fg(Color::Red),
    }
}

/// Compact `a-b` runs, e.g. `4-7 9`.
fn format_leds(leds: &[usize]) -> String {
    let mut parts = Vec::new();
    let mut iter = leds.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if end == start {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{}-{}", start, end));
        }
    }
    parts.join(" ")
}

pub fn print_mapping_table(run: &MappingRun) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Note"),
        Cell::new("Type"),
        Cell::new("Exposed (mm)"),
        Cell::new("#"),
        Cell::new("LEDs").add_attribute(Attribute::Bold),
    ]);
    right_align(&mut table, 1..=4);

    for (key, mapped) in run.geometry.keys.iter().zip(run.mapping.keys()) {
        let type_cell = match key.key_type {
            KeyType::White => Cell::new(key.key_type.to_string()),
            KeyType::Black => Cell::new(key.key_type.to_string()).fg(Color::DarkGrey),
        };
        let count_cell = if mapped.leds.is_empty() {
            Cell::new("0").fg(Color::Red)
        } else {
            Cell::new(mapped.leds.len().to_string())
        };

        table.add_row(vec![
            Cell::new(key.index).add_attribute(Attribute::Bold),
            Cell::new(key.note_number),
            type_cell,
            Cell::new(format!(
                "{:.1} .. {:.1}",
                key.exposed_start_mm, key.exposed_end_mm
            )),
            count_cell,
            Cell::new(format_leds(&mapped.leds)),
        ]);
    }
    println!("\n{}", table);
    println!(
        "{} keys | {} entries | {} unique LEDs | {} shared | pitch {:.4} mm",
        run.mapping.len(),
        run.mapping.total_entries(),
        run.mapping.unique_leds().len(),
        run.mapping.shared_entries(),
        run.strip.pitch_mm()
    );
}

pub fn print_pitch_report(pitch: &PitchCalibrationResult, passes: u8) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Pitch").add_attribute(Attribute::Bold),
        Cell::new("Theoretical"),
        Cell::new("Calibrated").fg(Color::Cyan),
        Cell::new("Delta"),
        Cell::new("Passes"),
    ]);
    right_align(&mut table, 1..=4);

    let delta = pitch.calibrated_pitch_mm - pitch.theoretical_pitch_mm;
    let status = if pitch.adjusted {
        Cell::new("adjusted").fg(Color::Yellow)
    } else {
        Cell::new("nominal").fg(Color::Green)
    };

    table.add_row(vec![
        status,
        Cell::new(format!("{:.4}", pitch.theoretical_pitch_mm)),
        Cell::new(format!("{:.4}", pitch.calibrated_pitch_mm)).fg(Color::Cyan),
        Cell::new(format!("{:+.4}", delta)),
        Cell::new(passes),
    ]);
    println!("\n{}", table);
}

pub fn print_key_quality_table(per_key: &[KeyQuality]) {
    if per_key.is_empty() {
        println!("\n(no keys selected)");
        return;
    }

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Note"),
        Cell::new("LEDs"),
        Cell::new("Sym"),
        Cell::new("Cons"),
        Cell::new("Score").add_attribute(Attribute::Bold),
        Cell::new("Grade"),
    ]);
    right_align(&mut table, 1..=5);

    for q in per_key {
        table.add_row(vec![
            Cell::new(q.key_index).add_attribute(Attribute::Bold),
            Cell::new(q.note_number),
            Cell::new(format_leds(&q.led_indices)),
            Cell::new(format!("{:.2}", q.symmetry_score)),
            Cell::new(format!("{:.2}", q.consistency_score)),
            Cell::new(format!("{:.2}", q.combined_score)).add_attribute(Attribute::Bold),
            grade_cell(q.quality_label),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_aggregate_report(agg: &AggregateQuality) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Summary").add_attribute(Attribute::Bold),
        Cell::new("Value"),
    ]);
    right_align(&mut table, 1..=1);

    let rows: Vec<(&str, String)> = vec![
        ("Avg LEDs / key", format!("{:.2}", agg.avg_leds_per_key)),
        ("Unique LEDs", agg.total_leds_used.to_string()),
        ("Entries", agg.total_entries.to_string()),
        ("Shared entries", agg.shared_entries.to_string()),
        ("Rescued entries", agg.rescued_entries.to_string()),
        ("Consecutive keys", agg.consecutive_coverage_count.to_string()),
        ("Overall score", format!("{:.3}", agg.overall_score)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    for grade in QualityGrade::iter() {
        let count = agg.grade_counts.get(&grade).copied().unwrap_or(0);
        table.add_row(vec![grade_cell(grade), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("Overall").add_attribute(Attribute::Bold),
        grade_cell(agg.overall_quality),
    ]);
    if agg.coverage_shortfall {
        table.add_row(vec![
            Cell::new("Coverage").add_attribute(Attribute::Bold),
            Cell::new("SHORTFALL").fg(Color::Red),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_warnings(warnings: &[MappingWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n⚠️  {} warning(s):", warnings.len());
    for w in warnings {
        println!("   - {}", w);
    }
}

pub fn print_survey_table(rows: &[SurveyRow]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Keyboard").add_attribute(Attribute::Bold),
        Cell::new("Notes"),
        Cell::new("Pitch").fg(Color::Cyan),
        Cell::new("Passes"),
        Cell::new("Entries"),
        Cell::new("Shared"),
        Cell::new("Avg/key"),
        Cell::new("Score").add_attribute(Attribute::Bold),
        Cell::new("Quality"),
    ]);
    right_align(&mut table, 2..=7);

    for row in rows {
        let notes = format!(
            "{}-{}",
            row.size.lowest_note(),
            row.size.highest_note()
        );
        match &row.outcome {
            Ok((run, diag)) => {
                let agg = &diag.aggregate;
                let pitch_cell = Cell::new(format!("{:.4}", run.pitch.calibrated_pitch_mm));
                table.add_row(vec![
                    Cell::new(row.size).add_attribute(Attribute::Bold),
                    Cell::new(notes),
                    if run.pitch.adjusted {
                        pitch_cell.fg(Color::Yellow)
                    } else {
                        pitch_cell.fg(Color::Cyan)
                    },
                    Cell::new(run.passes),
                    Cell::new(agg.total_entries),
                    Cell::new(agg.shared_entries),
                    Cell::new(format!("{:.2}", agg.avg_leds_per_key)),
                    Cell::new(format!("{:.3}", agg.overall_score)).add_attribute(Attribute::Bold),
                    grade_cell(agg.overall_quality),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(row.size).add_attribute(Attribute::Bold),
                    Cell::new(notes),
                    Cell::new(format!("❌ {}", e)).fg(Color::Red),
                ]);
            }
        }
    }
    println!("\n{}", table);
}
