//! Placeholders left in compiled formulas for the grid writer to fill.

pub use metasheet_catalog::CELL_PLACEHOLDER as CELL;

/// The whole data column of the field, used by uniqueness checks.
pub const COLUMN_RANGE: &str = "{col_range}";

/// The 1-based row index in default-fill formulas.
pub const ROW: &str = "{row}";

/// Substitute concrete references into a constraint formula.
pub fn render_formula(formula: &str, cell: &str, column_range: &str) -> String {
    formula.replace(CELL, cell).replace(COLUMN_RANGE, column_range)
}

/// Substitute the row index into a default-fill formula.
pub fn render_default(formula: &str, row: usize) -> String {
    formula.replace(ROW, &row.to_string())
}
