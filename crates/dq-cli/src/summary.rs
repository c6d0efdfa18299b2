use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunReport;

pub fn print_summary(report: &RunReport) {
    println!(
        "Run started: {} ({:.1}s)",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.duration.as_secs_f64()
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Loaded"),
        header_cell("Schema rejected"),
        header_cell("Rule rejected"),
        header_cell("Status"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for idx in 2..=4 {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    let mut total_schema = 0usize;
    let mut total_rules = 0usize;
    for outcome in &report.sources {
        total_schema += outcome.schema_rejected;
        total_rules += outcome.rule_rejected;
        table.add_row(vec![
            Cell::new(&outcome.name),
            Cell::new(&outcome.target_table),
            Cell::new(outcome.loaded),
            count_cell(outcome.schema_rejected),
            count_cell(outcome.rule_rejected),
            status_cell(outcome.error.as_deref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(report.total_loaded()).add_attribute(Attribute::Bold),
        count_cell(total_schema).add_attribute(Attribute::Bold),
        count_cell(total_rules).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    println!("{table}");

    let failures: Vec<_> = report
        .sources
        .iter()
        .filter_map(|s| s.error.as_ref().map(|e| (s.name.as_str(), e)))
        .collect();
    if !failures.is_empty() {
        eprintln!("Errors:");
        for (name, error) in failures {
            eprintln!("- {name}: {error}");
        }
    }
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow)
    } else {
        Cell::new(count)
    }
}

fn status_cell(error: Option<&str>) -> Cell {
    match error {
        None => Cell::new("ok").fg(Color::Green),
        Some(_) => Cell::new("failed").fg(Color::Red),
    }
}
