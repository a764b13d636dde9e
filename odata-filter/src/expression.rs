//! Parsing of extended filter expressions such as `start_date > "2020-08-01"`.
//!
//! An expression is `field operator (field | literal)`. Tokens may be
//! separated by any amount of whitespace, including none (`a==b`).
//!
//! Quoted literals accept either quote character. Inside a literal the other
//! quote character needs no escaping; the enclosing quote character and the
//! backslash itself are escaped with a backslash. Any other backslash is kept
//! as written.

use crate::errors::FilterError;
use crate::value::FilterValue;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub(crate) const GRAMMAR: &str =
    "`field operator (field|literal)` with operator one of <, >, <=, >=, !=, ==";

static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();

fn number_regex() -> &'static Regex {
    NUMBER_REGEX.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("valid number regex")
    })
}

/// Comparison operators, longest symbols first so `<=` wins over `<`
const OPERATORS: [(&str, CompareOp); 6] = [
    (">=", CompareOp::GreaterThanOrEqual),
    ("<=", CompareOp::LessThanOrEqual),
    ("==", CompareOp::Equal),
    ("!=", CompareOp::NotEqual),
    ("<", CompareOp::LessThan),
    (">", CompareOp::GreaterThan),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

impl CompareOp {
    /// The symbol used in extended filters
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::LessThan => "<",
            CompareOp::GreaterThan => ">",
            CompareOp::LessThanOrEqual => "<=",
            CompareOp::GreaterThanOrEqual => ">=",
        }
    }

    /// The OData keyword
    pub fn odata(&self) -> &'static str {
        match self {
            CompareOp::Equal => "eq",
            CompareOp::NotEqual => "ne",
            CompareOp::LessThan => "lt",
            CompareOp::GreaterThan => "gt",
            CompareOp::LessThanOrEqual => "le",
            CompareOp::GreaterThanOrEqual => "ge",
        }
    }

    /// Whether `left op right` holds given the ordering of left to right
    pub fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CompareOp::Equal => ordering == Equal,
            CompareOp::NotEqual => ordering != Equal,
            CompareOp::LessThan => ordering == Less,
            CompareOp::GreaterThan => ordering == Greater,
            CompareOp::LessThanOrEqual => ordering != Greater,
            CompareOp::GreaterThanOrEqual => ordering != Less,
        }
    }
}

impl FromStr for CompareOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS
            .iter()
            .find(|(symbol, _)| *symbol == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| FilterError::Parse {
                expression: s.to_string(),
                reason: format!("invalid comparison operator '{}'", s),
            })
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.odata())
    }
}

/// Right-hand side of an extended filter
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(FilterValue),
    Field(String),
}

/// A parsed `field operator (field|literal)` expression
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedFilter {
    pub field: String,
    pub op: CompareOp,
    pub rhs: Operand,
}

impl FromStr for ExtendedFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

enum State<'a> {
    Start,
    Field,
    Operator { field: &'a str },
    Rhs { field: &'a str, op: CompareOp },
    Done(ExtendedFilter),
}

fn parse(expression: &str) -> Result<ExtendedFilter, FilterError> {
    let fail = |reason: String| FilterError::Parse {
        expression: expression.to_string(),
        reason,
    };
    let mut cursor = Cursor::new(expression);
    let mut state = State::Start;

    loop {
        state = match state {
            State::Start => {
                cursor.skip_whitespace();
                if cursor.is_at_end() {
                    return Err(fail("expression is empty".to_string()));
                }
                State::Field
            }
            State::Field => {
                let field = cursor.take_while(is_identifier_char);
                if field.is_empty() {
                    return Err(fail(format!(
                        "expected a field name at position {}",
                        cursor.pos
                    )));
                }
                cursor.skip_whitespace();
                State::Operator { field }
            }
            State::Operator { field } => {
                let op = cursor.take_operator().ok_or_else(|| {
                    fail(format!(
                        "expected a comparison operator at position {}, found '{}'",
                        cursor.pos,
                        cursor.rest()
                    ))
                })?;
                cursor.skip_whitespace();
                State::Rhs { field, op }
            }
            State::Rhs { field, op } => {
                let rhs = cursor.take_operand().map_err(fail)?;
                cursor.skip_whitespace();
                State::Done(ExtendedFilter {
                    field: field.to_string(),
                    op,
                    rhs,
                })
            }
            State::Done(filter) => {
                if !cursor.is_at_end() {
                    return Err(fail(format!(
                        "unexpected '{}' after the right-hand side",
                        cursor.rest()
                    )));
                }
                return Ok(filter);
            }
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn is_identifier(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_identifier_char)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        &rest[..end]
    }

    fn take_operator(&mut self) -> Option<CompareOp> {
        let (symbol, op) = OPERATORS
            .iter()
            .find(|(symbol, _)| self.rest().starts_with(symbol))?;
        self.pos += symbol.len();
        Some(*op)
    }

    fn take_operand(&mut self) -> Result<Operand, String> {
        match self.rest().chars().next() {
            None => Err("expected a field name or literal after the operator".to_string()),
            Some(quote @ ('\'' | '"')) => self
                .take_quoted(quote)
                .map(|text| Operand::Literal(FilterValue::Str(text))),
            Some(_) => {
                let token = self.take_while(|c| !c.is_whitespace());
                classify_unquoted(token)
            }
        }
    }

    fn take_quoted(&mut self, quote: char) -> Result<String, String> {
        let start = self.pos;
        self.pos += quote.len_utf8();
        let mut text = String::new();
        let mut chars = self.rest().char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            if c == '\\' {
                if let Some(&(_, next)) = chars.peek() {
                    if next == quote || next == '\\' {
                        text.push(next);
                        chars.next();
                        continue;
                    }
                }
                text.push(c);
            } else if c == quote {
                self.pos += offset + c.len_utf8();
                return Ok(text);
            } else {
                text.push(c);
            }
        }
        Err(format!(
            "unterminated quoted literal starting at position {}",
            start
        ))
    }
}

/// Numbers and the keywords `null`, `true`, `false` are literals; any other
/// identifier names a field
fn classify_unquoted(token: &str) -> Result<Operand, String> {
    if number_regex().is_match(token) {
        return parse_number(token).map(Operand::Literal);
    }
    match token {
        "null" => Ok(Operand::Literal(FilterValue::Null)),
        "true" => Ok(Operand::Literal(FilterValue::Bool(true))),
        "false" => Ok(Operand::Literal(FilterValue::Bool(false))),
        _ if is_identifier(token) => Ok(Operand::Field(token.to_string())),
        _ => Err(format!(
            "'{}' is neither a quoted literal, a number nor a field name",
            token
        )),
    }
}

fn parse_number(token: &str) -> Result<FilterValue, String> {
    if token.contains(['.', 'e', 'E']) {
        token
            .parse::<f64>()
            .map(FilterValue::Float)
            .map_err(|e| format!("invalid number '{}': {}", token, e))
    } else {
        // Integers beyond i64 are still numbers
        token
            .parse::<i64>()
            .map(FilterValue::Int)
            .or_else(|_| token.parse::<f64>().map(FilterValue::Float))
            .map_err(|e| format!("invalid number '{}': {}", token, e))
    }
}
