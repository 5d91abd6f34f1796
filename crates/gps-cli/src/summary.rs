use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use gps_model::{CanonicalRow, PlayerResolution, ResolutionSource};

use crate::commands::{CanonicalizeResult, SuggestResult};
use crate::logging::redact_value;

pub fn print_canonical_summary(result: &CanonicalizeResult) {
    let output = &result.output;
    let diagnostics = &output.diagnostics;
    println!("Output: {}", result.output_path.display());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Player"),
        header_cell("Match"),
        header_cell("Values"),
        header_cell("Unavailable"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for row in &output.rows {
        table.add_row(vec![
            Cell::new(row.row_index),
            player_cell(row),
            resolution_cell(&row.player),
            Cell::new(row.values.len()),
            count_cell(row.unavailable.len(), Color::DarkGrey),
            count_cell(row.warnings.len(), Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} resolved, {} unresolved",
            diagnostics.resolved_count, diagnostics.unresolved_count
        ))
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(diagnostics.warning_count, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if diagnostics.skipped_summary_rows > 0 {
        println!("Skipped summary rows: {}", diagnostics.skipped_summary_rows);
    }
    if !diagnostics.missing_headers.is_empty() {
        let codes: Vec<&str> = diagnostics
            .missing_headers
            .iter()
            .map(|code| code.as_str())
            .collect();
        println!("Missing headers: {}", codes.join(", "));
    }
    for warning in &diagnostics.report_warnings {
        eprintln!("warning: {warning}");
    }
    if !output.pending_reviews.is_empty() {
        println!("Pending reviews: {}", output.pending_reviews.len());
    }
    if !output.new_player_mapping_suggestions.is_empty() {
        println!(
            "New player matches: {} ({} saved to memory)",
            output.new_player_mapping_suggestions.len(),
            result.remembered
        );
    }
}

pub fn print_suggest_summary(result: &SuggestResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Metric"),
        header_cell("Unit"),
        header_cell("Confidence"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in result.profile.columns() {
        match result.suggestions.get(&column.mapped_column) {
            Some(suggestion) => table.add_row(vec![
                Cell::new(&column.mapped_column),
                Cell::new(suggestion.metric.as_str()).fg(Color::Blue),
                Cell::new(suggestion.source_unit.as_deref().unwrap_or("-")),
                Cell::new(format!("{:.2}", suggestion.confidence)),
                Cell::new(format!("{:?}", suggestion.reason).to_lowercase()),
            ]),
            None => table.add_row(vec![
                dim_cell(&column.mapped_column),
                dim_cell("unmapped"),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    println!("{table}");
    println!(
        "{} of {} headers mapped",
        result.suggestions.len(),
        result.suggestions.len() + result.unmapped_columns.len()
    );
    if let Some(path) = &result.output_path {
        println!("Profile: {}", path.display());
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn player_cell(row: &CanonicalRow) -> Cell {
    match (&row.player, row.raw_name.as_deref()) {
        (PlayerResolution::Resolved { player_id, .. }, _) => Cell::new(player_id.as_str()),
        (PlayerResolution::PendingReview { candidate, .. }, _) => {
            Cell::new(format!("{candidate}?")).fg(Color::Yellow)
        }
        (PlayerResolution::Unresolved, Some(name)) => dim_cell(redact_value(name)),
        (PlayerResolution::Unresolved, None) => dim_cell("-"),
    }
}

fn resolution_cell(resolution: &PlayerResolution) -> Cell {
    match resolution {
        PlayerResolution::Resolved {
            source: ResolutionSource::Memory,
            ..
        } => Cell::new("memory").fg(Color::Green),
        PlayerResolution::Resolved { confidence, .. } => {
            Cell::new(format!("fuzzy {confidence:.2}")).fg(Color::Green)
        }
        PlayerResolution::PendingReview { confidence, .. } => {
            Cell::new(format!("review {confidence:.2}")).fg(Color::Yellow)
        }
        PlayerResolution::Unresolved => Cell::new("unresolved").fg(Color::Red),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
