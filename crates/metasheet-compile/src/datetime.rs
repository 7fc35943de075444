//! Component-wise date/time comparison.
//!
//! Spreadsheet engines parse partial-precision dates (`2008`, `2008-12`)
//! inconsistently, so both the cell and the threshold are split into
//! year, month, day, hour, minute and second and compared as integers,
//! most significant component first.

use chrono::{NaiveDate, NaiveTime};
use metasheet_catalog::RegexCatalog;
use metasheet_model::Literal;

use crate::comparison::Comparison;
use crate::error::{CompileError, Result};

/// Start (1-based) and length of each component in `YYYY-MM-DD HH:MM:SS`.
const POSITIONS: [(usize, usize); 6] = [(1, 4), (6, 2), (9, 2), (12, 2), (15, 2), (18, 2)];

/// Value an absent component takes: January, the first, midnight.
const FLOORS: [u32; 6] = [0, 1, 1, 0, 0, 0];

/// A threshold decomposed into all six components, absent ones floored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatetimeThreshold {
    parts: [u32; 6],
}

impl DatetimeThreshold {
    pub fn parse(
        threshold: &Literal,
        comparison: Comparison,
        catalog: &RegexCatalog,
    ) -> Result<Self> {
        let format = catalog
            .datetime()
            .ok_or(CompileError::MissingDatetimeFormat)?;
        let text = threshold.to_string();
        let invalid = || CompileError::InvalidThreshold {
            key: comparison.key(),
            value: text.clone(),
            expected: "date/time",
        };

        let components = format.components(&text).ok_or_else(invalid)?;
        let year = components[0].ok_or_else(invalid)?;
        let mut parts = [0; 6];
        for (index, part) in parts.iter_mut().enumerate() {
            *part = components[index].unwrap_or(FLOORS[index]);
        }
        parts[0] = year;

        let year = i32::try_from(year).map_err(|_| invalid())?;
        NaiveDate::from_ymd_opt(year, parts[1], parts[2]).ok_or_else(invalid)?;
        NaiveTime::from_hms_opt(parts[3], parts[4], parts[5]).ok_or_else(invalid)?;
        Ok(Self { parts })
    }

    pub fn parts(&self) -> [u32; 6] {
        self.parts
    }
}

/// Formula comparing the cell against the threshold.
///
/// Components are compared only while all more significant ones are equal.
/// A component missing from the cell takes the same floor the threshold
/// uses; one that is present but not a number becomes a value just past
/// the threshold on the failing side.
pub fn comparison_formula(threshold: &DatetimeThreshold, comparison: Comparison) -> String {
    let component = |index: usize| {
        let (start, length) = POSITIONS[index];
        let target = i64::from(threshold.parts[index]);
        let failing = target + comparison.failing_offset();
        let parsed = format!("IFERROR(VALUE(MID({{cell}},{start},{length})),{failing})");
        if index == 0 {
            parsed
        } else {
            format!("IF(LEN({{cell}})<{start},{},{parsed})", FLOORS[index])
        }
    };

    let last = POSITIONS.len() - 1;
    let mut formula = format!(
        "{}{}{}",
        component(last),
        comparison.operator(),
        threshold.parts[last]
    );
    for index in (0..last).rev() {
        let value = component(index);
        let target = threshold.parts[index];
        formula = format!(
            "IF({value}<>{target},{value}{}{target},{formula})",
            comparison.strict_operator()
        );
    }
    formula
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RegexCatalog {
        RegexCatalog::builtin().unwrap()
    }

    #[test]
    fn partial_threshold_floors_missing_components() {
        let threshold =
            DatetimeThreshold::parse(&Literal::text("2008-12"), Comparison::AtLeast, &catalog())
                .unwrap();
        assert_eq!(threshold.parts(), [2008, 12, 1, 0, 0, 0]);
    }

    #[test]
    fn impossible_date_is_rejected() {
        let err = DatetimeThreshold::parse(
            &Literal::text("2009-02-30"),
            Comparison::AtMost,
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::InvalidThreshold { .. }));
    }

    #[test]
    fn unparseable_threshold_is_rejected() {
        let err = DatetimeThreshold::parse(
            &Literal::text("next tuesday"),
            Comparison::AtLeast,
            &catalog(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "min threshold next tuesday is not a valid date/time value"
        );
    }

    #[test]
    fn missing_catalog_entry_is_reported() {
        let err = DatetimeThreshold::parse(
            &Literal::text("2008"),
            Comparison::AtLeast,
            &RegexCatalog::empty(),
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MissingDatetimeFormat));
    }

    #[test]
    fn cascade_ends_with_seconds() {
        let threshold =
            DatetimeThreshold::parse(&Literal::text("2008"), Comparison::Below, &catalog())
                .unwrap();
        let formula = comparison_formula(&threshold, Comparison::Below);
        assert!(formula.starts_with("IF(IFERROR(VALUE(MID({cell},1,4)),2009)<>2008,"));
        assert!(formula.ends_with(
            "IF(LEN({cell})<18,0,IFERROR(VALUE(MID({cell},18,2)),1))<0)))))"
        ));
    }
}
