use crate::OutputMode;

/// Logical connective used to join constraint fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    fn function(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    fn conjunction(self) -> &'static str {
        match self {
            Connective::And => " and ",
            Connective::Or => " or ",
        }
    }
}

/// Join fragments with a connective.
///
/// No fragments yields `None`; a single fragment is returned unwrapped.
pub fn combine(mut parts: Vec<String>, connective: Connective, mode: OutputMode) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(match mode {
            OutputMode::Formula => format!("{}({})", connective.function(), parts.join(",")),
            OutputMode::Description => parts.join(connective.conjunction()),
        }),
    }
}

/// Quote a literal for use inside a formula, doubling embedded quotes.
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_operand_is_unwrapped() {
        let parts = vec!["{cell}<>\"x\"".to_string()];
        assert_eq!(
            combine(parts, Connective::And, OutputMode::Formula).as_deref(),
            Some("{cell}<>\"x\"")
        );
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(combine(Vec::new(), Connective::Or, OutputMode::Formula), None);
    }

    #[test]
    fn modes_join_differently() {
        let parts = || vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            combine(parts(), Connective::Or, OutputMode::Formula).as_deref(),
            Some("OR(a,b)")
        );
        assert_eq!(
            combine(parts(), Connective::And, OutputMode::Description).as_deref(),
            Some("a and b")
        );
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote(r#"6" pot"#), r#""6"" pot""#);
    }
}
