//! Literal values as produced by the parser.
//!
//! The parser keeps literals close to their source text: numbers and
//! date/times stay textual so that coercion can be driven by the declared
//! property type rather than by the literal's syntax. Durations are the
//! exception, they arrive already split into calendar fields.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::LiteralError;

/// `PnYnMnDTnHnMnS`, every component optional, no fractions or weeks.
static ISO_DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .unwrap()
});

/// Raw literal stored on an AST literal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    /// Quoted string, still carrying the parser's `''` quote doubling.
    /// Comparison and pattern translation both collapse it to a single `'`.
    Text(String),
    /// Numeric lexeme as written.
    Number(String),
    /// Date or date/time lexeme as written.
    DateTime(String),
    Duration(CalendarDuration),
}

impl LiteralValue {
    /// Source text of the literal, the input to property-type coercion.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            LiteralValue::Text(s) | LiteralValue::Number(s) | LiteralValue::DateTime(s) => {
                Cow::Borrowed(s.as_str())
            }
            LiteralValue::Duration(d) => Cow::Owned(d.to_string()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::Text(_) => "text",
            LiteralValue::Number(_) => "number",
            LiteralValue::DateTime(_) => "date_time",
            LiteralValue::Duration(_) => "duration",
        }
    }
}

/// A calendar duration: each field is added with calendar semantics, so
/// one month is not a fixed number of seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarDuration {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalendarDuration {
    pub fn years(years: u32) -> Self {
        Self { years, ..Default::default() }
    }

    pub fn months(months: u32) -> Self {
        Self { months, ..Default::default() }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl FromStr for CalendarDuration {
    type Err = LiteralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || LiteralError::InvalidDuration {
            text: text.to_string(),
        };

        // "P" and "PT" match the pattern but carry no component
        if text.len() < 3 || text.ends_with('T') {
            return Err(invalid());
        }
        let caps = ISO_DURATION_PATTERN.captures(text).ok_or_else(invalid)?;

        let field = |index: usize, component: &'static str| -> Result<u32, LiteralError> {
            match caps.get(index) {
                Some(m) => m.as_str().parse().map_err(|_| LiteralError::DurationOutOfRange {
                    text: text.to_string(),
                    component,
                }),
                None => Ok(0),
            }
        };

        Ok(Self {
            years: field(1, "years")?,
            months: field(2, "months")?,
            days: field(3, "days")?,
            hours: field(4, "hours")?,
            minutes: field(5, "minutes")?,
            seconds: field(6, "seconds")?,
        })
    }
}

impl fmt::Display for CalendarDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }
        write!(f, "P")?;
        for (value, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value > 0 {
                write!(f, "{}{}", value, unit)?;
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if value > 0 {
                    write!(f, "{}{}", value, unit)?;
                }
            }
        }
        Ok(())
    }
}
