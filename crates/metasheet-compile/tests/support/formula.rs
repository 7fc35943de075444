//! A small evaluator for the spreadsheet formula subset the compiler emits.
//!
//! Values follow spreadsheet typing closely enough for validation checks:
//! a cell holding digits is a number, comparisons between numbers and text
//! order every number before any text, and errors propagate until caught by
//! `IFERROR`, `ISERROR` or an `IS*` test.

#![allow(dead_code)]

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Error,
}

impl Value {
    /// Value of a typed-in cell: numbers become numbers, everything else text.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        let numeric_chars = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-'));
        match trimmed.parse::<f64>() {
            Ok(number) if !trimmed.is_empty() && numeric_chars => Value::Number(number),
            _ => Value::Text(input.to_string()),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Value::Number(number) => Some(format!("{number}")),
            Value::Text(text) => Some(text.clone()),
            Value::Bool(true) => Some("TRUE".to_string()),
            Value::Bool(false) => Some("FALSE".to_string()),
            Value::Error => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            Value::Text(text) if !text.trim().is_empty() => text.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => Some(*number != 0.0),
            _ => None,
        }
    }
}

/// Names visible to a formula: `CELL`, `COLUMN` and any trigger references.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: HashMap<String, Value>,
    column: Vec<Value>,
}

impl Sheet {
    pub fn new(cell: &str) -> Self {
        let mut sheet = Self::default();
        sheet.cells.insert("CELL".to_string(), Value::from_input(cell));
        sheet.column.push(Value::from_input(cell));
        sheet
    }

    pub fn with_column(mut self, others: &[&str]) -> Self {
        self.column
            .extend(others.iter().map(|value| Value::from_input(value)));
        self
    }

    pub fn with_ref(mut self, name: &str, input: &str) -> Self {
        self.cells.insert(name.to_string(), Value::from_input(input));
        self
    }

    /// Evaluate a compiled formula, binding `{cell}` and `{col_range}`.
    pub fn evaluate(&self, formula: &str) -> Value {
        let source = formula
            .trim_start_matches('=')
            .replace("{cell}", "CELL")
            .replace("{col_range}", "COLUMN");
        let mut parser = Parser::new(&source);
        let expr = parser.parse_expr();
        assert!(
            parser.at_end(),
            "trailing input at {} in {formula}",
            parser.pos
        );
        self.eval(&expr)
    }

    fn eval(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Number(number) => Value::Number(*number),
            Expr::Text(text) => Value::Text(text.clone()),
            Expr::Bool(flag) => Value::Bool(*flag),
            Expr::Ref(name) => self
                .cells
                .get(name)
                .cloned()
                .unwrap_or(Value::Text(String::new())),
            Expr::Neg(inner) => match self.eval(inner).as_number() {
                Some(number) => Value::Number(-number),
                None => Value::Error,
            },
            Expr::Compare(op, left, right) => compare(*op, &self.eval(left), &self.eval(right)),
            Expr::Call(name, args) => self.call(name, args),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Value {
        let arg = |index: usize| self.eval(&args[index]);
        match name {
            "IF" => match arg(0).as_bool() {
                Some(true) => arg(1),
                Some(false) => arg(2),
                None => Value::Error,
            },
            "IFERROR" => match arg(0) {
                Value::Error => arg(1),
                value => value,
            },
            "ISERROR" => Value::Bool(arg(0) == Value::Error),
            "ISNUMBER" => Value::Bool(matches!(arg(0), Value::Number(_))),
            "NOT" => arg(0).as_bool().map_or(Value::Error, |flag| Value::Bool(!flag)),
            "AND" | "OR" => {
                let mut flags = Vec::new();
                for index in 0..args.len() {
                    match arg(index).as_bool() {
                        Some(flag) => flags.push(flag),
                        None => return Value::Error,
                    }
                }
                if name == "AND" {
                    Value::Bool(flags.iter().all(|flag| *flag))
                } else {
                    Value::Bool(flags.iter().any(|flag| *flag))
                }
            }
            "VALUE" => match arg(0) {
                Value::Number(number) => Value::Number(number),
                Value::Text(text) => text.trim().parse().map_or(Value::Error, Value::Number),
                _ => Value::Error,
            },
            "INT" => arg(0)
                .as_number()
                .map_or(Value::Error, |number| Value::Number(number.floor())),
            "LEN" => arg(0)
                .as_text()
                .map_or(Value::Error, |text| Value::Number(text.chars().count() as f64)),
            "LEFT" => match (arg(0).as_text(), arg(1).as_number()) {
                (Some(text), Some(count)) => {
                    Value::Text(text.chars().take(count as usize).collect())
                }
                _ => Value::Error,
            },
            "MID" => match (arg(0).as_text(), arg(1).as_number(), arg(2).as_number()) {
                (Some(text), Some(start), Some(length)) if start >= 1.0 => Value::Text(
                    text.chars()
                        .skip(start as usize - 1)
                        .take(length as usize)
                        .collect(),
                ),
                _ => Value::Error,
            },
            "FIND" => match (arg(0).as_text(), arg(1).as_text()) {
                (Some(needle), Some(haystack)) => haystack
                    .find(&needle)
                    .map_or(Value::Error, |index| {
                        Value::Number((haystack[..index].chars().count() + 1) as f64)
                    }),
                _ => Value::Error,
            },
            "EXACT" => match (arg(0).as_text(), arg(1).as_text()) {
                (Some(left), Some(right)) => Value::Bool(left == right),
                _ => Value::Error,
            },
            "COUNTIF" => {
                let target = arg(1);
                let count = self
                    .column
                    .iter()
                    .filter(|value| compare(CompareOp::Eq, value, &target) == Value::Bool(true))
                    .count();
                Value::Number(count as f64)
            }
            other => panic!("unsupported function {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Value {
    use std::cmp::Ordering;

    fn rank(value: &Value) -> u8 {
        match value {
            Value::Number(_) => 0,
            Value::Text(_) => 1,
            Value::Bool(_) => 2,
            Value::Error => 3,
        }
    }

    if *left == Value::Error || *right == Value::Error {
        return Value::Error;
    }
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Text(a), Value::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    };
    Value::Bool(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    Text(String),
    Bool(bool),
    Ref(String),
    Neg(Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            source,
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_spaces();
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) {
        self.skip_spaces();
        assert_eq!(
            self.peek(),
            Some(expected),
            "expected {expected} at {} in {}",
            self.pos,
            self.source
        );
        self.pos += 1;
    }

    fn parse_expr(&mut self) -> Expr {
        let left = self.parse_unary();
        self.skip_spaces();
        let op = match (self.peek(), self.chars.get(self.pos + 1).copied()) {
            (Some('<'), Some('>')) => Some((CompareOp::Ne, 2)),
            (Some('<'), Some('=')) => Some((CompareOp::Le, 2)),
            (Some('>'), Some('=')) => Some((CompareOp::Ge, 2)),
            (Some('<'), _) => Some((CompareOp::Lt, 1)),
            (Some('>'), _) => Some((CompareOp::Gt, 1)),
            (Some('='), _) => Some((CompareOp::Eq, 1)),
            _ => None,
        };
        match op {
            Some((op, width)) => {
                self.pos += width;
                let right = self.parse_unary();
                Expr::Compare(op, Box::new(left), Box::new(right))
            }
            None => left,
        }
    }

    fn parse_unary(&mut self) -> Expr {
        self.skip_spaces();
        if self.peek() == Some('-') {
            self.pos += 1;
            return Expr::Neg(Box::new(self.parse_unary()));
        }
        self.parse_term()
    }

    fn parse_term(&mut self) -> Expr {
        self.skip_spaces();
        match self.peek() {
            Some('"') => self.parse_string(),
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_expr();
                self.expect(')');
                inner
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == '$' => self.parse_name(),
            other => panic!("unexpected {other:?} at {} in {}", self.pos, self.source),
        }
    }

    fn parse_string(&mut self) -> Expr {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('"') if self.chars.get(self.pos + 1) == Some(&'"') => {
                    text.push('"');
                    self.pos += 2;
                }
                Some('"') => {
                    self.pos += 1;
                    return Expr::Text(text);
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
                None => panic!("unterminated string in {}", self.source),
            }
        }
    }

    fn parse_number(&mut self) -> Expr {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Expr::Number(text.parse().unwrap_or_else(|_| panic!("bad number {text}")))
    }

    fn parse_name(&mut self) -> Expr {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        self.skip_spaces();
        if self.peek() == Some('(') {
            self.pos += 1;
            let mut args = Vec::new();
            self.skip_spaces();
            if self.peek() == Some(')') {
                self.pos += 1;
                return Expr::Call(name.to_uppercase(), args);
            }
            loop {
                args.push(self.parse_expr());
                self.skip_spaces();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some(')') => {
                        self.pos += 1;
                        return Expr::Call(name.to_uppercase(), args);
                    }
                    other => panic!("unexpected {other:?} in arguments of {name}"),
                }
            }
        }
        match name.as_str() {
            "TRUE" => Expr::Bool(true),
            "FALSE" => Expr::Bool(false),
            _ => Expr::Ref(name),
        }
    }
}

/// Evaluate a compiled formula against one typed-in cell value.
pub fn evaluate(formula: &str, cell: &str) -> Value {
    Sheet::new(cell).evaluate(formula)
}

/// True when the formula accepts the cell value.
pub fn accepts(formula: &str, cell: &str) -> bool {
    evaluate(formula, cell) == Value::Bool(true)
}
