//! dayjs-style date patterns (`YYYY-MM-DD`, `DD/MM/YYYY`, ...) backed by
//! chrono's strftime machinery.

use std::fmt;

use chrono::NaiveDate;
use chrono::format::{Parsed, StrftimeItems};

use crate::{CalendarDate, DEFAULT_FORMAT, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    Month2,
    Month1,
    Day2,
    Day1,
    Literal(char),
}

impl Token {
    const fn strftime(self) -> &'static str {
        match self {
            Self::Year4 => "%Y",
            Self::Year2 => "%y",
            Self::Month2 => "%m",
            Self::Month1 => "%-m",
            Self::Day2 => "%d",
            Self::Day1 => "%-d",
            Self::Literal(_) => "",
        }
    }

    const fn is_year(self) -> bool {
        matches!(self, Self::Year4 | Self::Year2)
    }

    const fn is_month(self) -> bool {
        matches!(self, Self::Month1 | Self::Month2)
    }

    const fn is_day(self) -> bool {
        matches!(self, Self::Day1 | Self::Day2)
    }
}

/// A display/parse pattern built from `YYYY`, `YY`, `MM`, `M`, `DD` and `D`
/// tokens; every other character is a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    date_items: String,
    month_items: String,
}

impl DateFormat {
    /// # Errors
    /// Returns `ParseError::InvalidFormat` unless the pattern has a year, a
    /// month and a day token.
    pub fn new(pattern: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(pattern);
        let has = |pred: fn(&Token) -> bool| tokens.iter().any(pred);
        if !has(|t| t.is_year()) || !has(|t| t.is_month()) || !has(|t| t.is_day()) {
            return Err(ParseError::InvalidFormat(format!(
                "Pattern {pattern:?} needs year, month and day tokens"
            )));
        }

        Ok(Self {
            pattern: pattern.to_owned(),
            date_items: to_strftime(&tokens),
            month_items: to_strftime(&month_tokens(&tokens)),
        })
    }

    /// The canonical `YYYY-MM-DD` pattern
    pub fn iso() -> Self {
        Self::new(DEFAULT_FORMAT).unwrap_or_else(|_| Self {
            pattern: DEFAULT_FORMAT.to_owned(),
            date_items: "%Y-%m-%d".to_owned(),
            month_items: "%Y-%m".to_owned(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, date: &CalendarDate) -> String {
        render(date, &self.date_items)
    }

    /// Formats only the year and month tokens of the pattern, keeping their
    /// order: `DD/MM/YYYY` shows months as `MM/YYYY`.
    pub fn format_month(&self, date: &CalendarDate) -> String {
        render(date, &self.month_items)
    }

    /// # Errors
    /// Returns `ParseError::InvalidFormat` if `input` does not match the
    /// pattern, or the component error if it names an impossible date.
    pub fn parse(&self, input: &str) -> Result<CalendarDate, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let naive = NaiveDate::parse_from_str(input, &self.date_items)
            .map_err(|e| self.mismatch(input, &e))?;
        CalendarDate::try_from(naive)
    }

    /// Parses a string in the pattern's month form (see
    /// [`DateFormat::format_month`]), landing on the first of that month.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidFormat` if `input` does not match.
    pub fn parse_month(&self, input: &str) -> Result<CalendarDate, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let mut parsed = Parsed::new();
        chrono::format::parse(
            &mut parsed,
            input,
            StrftimeItems::new(&self.month_items),
        )
        .map_err(|e| self.mismatch(input, &e))?;
        parsed
            .set_day(1)
            .map_err(|e| self.mismatch(input, &e))?;
        let naive = parsed
            .to_naive_date()
            .map_err(|e| self.mismatch(input, &e))?;
        CalendarDate::try_from(naive)
    }

    fn mismatch(&self, input: &str, err: &chrono::ParseError) -> ParseError {
        ParseError::InvalidFormat(format!(
            "{input:?} does not match {:?}: {err}",
            self.pattern
        ))
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::iso()
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn render(date: &CalendarDate, items: &str) -> String {
    NaiveDate::from(*date).format(items).to_string()
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = pattern;
    while let Some(c) = rest.chars().next() {
        let (token, len) = match c {
            'Y' if rest.starts_with("YYYY") => (Token::Year4, 4),
            'Y' if rest.starts_with("YY") => (Token::Year2, 2),
            'M' if rest.starts_with("MM") => (Token::Month2, 2),
            'M' => (Token::Month1, 1),
            'D' if rest.starts_with("DD") => (Token::Day2, 2),
            'D' => (Token::Day1, 1),
            other => (Token::Literal(other), other.len_utf8()),
        };
        tokens.push(token);
        rest = &rest[len..];
    }
    tokens
}

/// Year and month tokens with the literals between them. A day token is
/// dropped along with the separator that follows it.
fn month_tokens(tokens: &[Token]) -> Vec<Token> {
    let year_or_month = |t: &Token| t.is_year() || t.is_month();
    let (Some(first), Some(last)) = (
        tokens.iter().position(year_or_month),
        tokens.iter().rposition(year_or_month),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut after_day = false;
    for &token in &tokens[first..=last] {
        match token {
            t if t.is_day() => after_day = true,
            Token::Literal(_) if after_day => {}
            t => {
                after_day = false;
                out.push(t);
            }
        }
    }
    out
}

fn to_strftime(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Literal('%') => out.push_str("%%"),
            Token::Literal(c) => out.push(*c),
            other => out.push_str(other.strftime()),
        }
    }
    out
}
