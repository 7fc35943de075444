use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use metasheet_catalog::RegexCatalog;
use metasheet_cli::report::{DescriptionRow, FieldReport};
use metasheet_schema::Combination;

pub fn print_field_reports(reports: &[FieldReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Formula"),
        header_cell("Description"),
        header_cell("Default"),
        header_cell("Validation"),
    ]);
    apply_report_table_style(&mut table);
    for report in reports {
        table.add_row(vec![
            field_cell(&report.field),
            optional_cell(report.formula.as_deref()),
            optional_cell(report.description.as_deref()),
            optional_cell(report.default_formula.as_deref()),
            match &report.validation {
                Some(rule) => Cell::new(rule.kind.as_str()).fg(Color::Green),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
}

pub fn print_descriptions(rows: &[DescriptionRow]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Description")]);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(vec![
            field_cell(&row.field_name),
            Cell::new(&row.field_description),
        ]);
    }
    println!("{table}");
}

pub fn print_combinations(combinations: &[Combination]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Environment"),
        header_cell("Sample type"),
        header_cell("Name"),
    ]);
    apply_table_style(&mut table);
    for combination in combinations {
        table.add_row(vec![
            field_cell(&combination.environment),
            Cell::new(&combination.sample_type),
            Cell::new(&combination.display_name),
        ]);
    }
    println!("{table}");
}

pub fn print_catalog(catalog: &RegexCatalog) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Format"),
        header_cell("Pattern"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for entry in catalog.entries() {
        table.add_row(vec![
            field_cell(&entry.name),
            Cell::new(&entry.pattern),
            Cell::new(&entry.message),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_report_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
        ]);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn field_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
