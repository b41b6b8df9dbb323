use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use eicu_cli::types::{FoldSummary, RunResult};

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    println!("Manifest: {}", result.manifest.display());
    println!("{}", build_table(result));
    println!();
    println!("Folds:");
    println!("{}", fold_table(&result.folds));
    println!("Finished in {:.1}s", result.duration_ms as f64 / 1000.0);
}

fn build_table(result: &RunResult) -> Table {
    let build = &result.build;
    let admissions = &result.ingest.admissions;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    let rows: Vec<(&str, Cell)> = vec![
        ("Admission rows", Cell::new(admissions.rows)),
        ("Patients", Cell::new(admissions.patients)),
        (
            "Excluded by duration",
            count_cell(admissions.excluded_by_duration, Color::Yellow),
        ),
        (
            "Unknown code rows",
            count_cell(result.ingest.dropped_rows(), Color::Yellow),
        ),
        ("Encounters", Cell::new(build.encounters)),
        (
            "Duplicate drops",
            count_cell(build.duplicate_dropped, Color::Yellow),
        ),
        (
            "Threshold drops",
            count_cell(build.threshold_dropped(), Color::Yellow),
        ),
        ("Kept", Cell::new(build.kept).add_attribute(Attribute::Bold)),
        ("Expired", Cell::new(build.expired)),
        ("Readmission", Cell::new(build.readmission)),
        ("Diagnosis vocabulary", Cell::new(result.dx_vocab)),
        ("Treatment vocabulary", Cell::new(result.proc_vocab)),
        (
            "Avg diagnoses (distinct)",
            Cell::new(format!(
                "{:.2} ({:.2})",
                build.avg_dx_codes(),
                build.avg_unique_dx_codes()
            )),
        ),
        (
            "Avg treatments (distinct)",
            Cell::new(format!(
                "{:.2} ({:.2})",
                build.avg_treatment_codes(),
                build.avg_unique_treatment_codes()
            )),
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), value]);
    }
    table
}

fn fold_table(folds: &[FoldSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Fold"),
        header_cell("Seed"),
        header_cell("Train"),
        header_cell("Validation"),
        header_cell("Test"),
        header_cell("Dx priors"),
        header_cell("Tx priors"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for fold in folds {
        table.add_row(vec![
            Cell::new(format!("fold_{}", fold.index))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            dim_cell(fold.seed),
            Cell::new(fold.train),
            Cell::new(fold.validation),
            Cell::new(fold.test),
            Cell::new(fold.dx_priors),
            Cell::new(fold.proc_priors),
        ]);
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
