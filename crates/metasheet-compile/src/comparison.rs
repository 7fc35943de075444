use metasheet_model::ValidationKey;

/// One of the four threshold keys, with its operator and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast,
    Above,
    AtMost,
    Below,
}

impl Comparison {
    /// In the order fragments are emitted.
    pub const ALL: [Comparison; 4] = [
        Comparison::AtLeast,
        Comparison::Above,
        Comparison::AtMost,
        Comparison::Below,
    ];

    pub fn key(self) -> ValidationKey {
        match self {
            Comparison::AtLeast => ValidationKey::MinInclusive,
            Comparison::Above => ValidationKey::MinExclusive,
            Comparison::AtMost => ValidationKey::MaxInclusive,
            Comparison::Below => ValidationKey::MaxExclusive,
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            Comparison::AtLeast => ">=",
            Comparison::Above => ">",
            Comparison::AtMost => "<=",
            Comparison::Below => "<",
        }
    }

    /// Operator deciding a component that differs from the threshold's.
    pub fn strict_operator(self) -> &'static str {
        match self {
            Comparison::AtLeast | Comparison::Above => ">",
            Comparison::AtMost | Comparison::Below => "<",
        }
    }

    /// Offset from the threshold that is guaranteed to fail the comparison.
    pub fn failing_offset(self) -> i64 {
        match self {
            Comparison::AtLeast | Comparison::Above => -1,
            Comparison::AtMost | Comparison::Below => 1,
        }
    }

    pub fn numeric_phrase(self) -> &'static str {
        match self {
            Comparison::AtLeast => "must be greater than or equal to",
            Comparison::Above => "must be greater than",
            Comparison::AtMost => "must be less than or equal to",
            Comparison::Below => "must be less than",
        }
    }

    pub fn datetime_phrase(self) -> &'static str {
        match self {
            Comparison::AtLeast => "must be on or after",
            Comparison::Above => "must be after",
            Comparison::AtMost => "must be on or before",
            Comparison::Below => "must be before",
        }
    }
}
