//! Table formatting using comfy-table.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use owo_colors::OwoColorize;

/// One row of `vc-tools list`.
pub struct TaskRow<'a> {
    pub name: &'a str,
    pub dependencies: &'a [String],
    pub summary: &'a str,
}

/// Prints registered tasks with their dependencies.
pub fn print_task_table(rows: &[TaskRow<'_>]) {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Depends on").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for row in rows {
        let deps = if row.dependencies.is_empty() {
            "-".bright_black().to_string()
        } else {
            row.dependencies.join(", ")
        };
        table.add_row(vec![
            Cell::new(row.name).fg(Color::White),
            Cell::new(deps).fg(Color::Cyan),
            Cell::new(row.summary).fg(Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}
