//! LIKE pattern normalization.
//!
//! CQL users escape wildcards the SQL way (`\%`, `\_`, `\\`), so the
//! pattern is passed through to the backend untouched except for the
//! parser's quote doubling. When an escape character survives, the backend
//! must render an explicit `ESCAPE '\'` clause, since not every database
//! treats backslash as the default escape.

/// Escape character the backend must declare when `requires_escape_clause` is set.
pub const ESCAPE_CHAR: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapedPattern {
    pub pattern: String,
    pub requires_escape_clause: bool,
}

/// Normalize a raw CQL string literal into a LIKE pattern.
///
/// `%` and `_` keep their wildcard meaning; case folding for ILIKE is left
/// to the backend.
pub fn escape_like_pattern(raw: &str) -> EscapedPattern {
    let pattern = raw.replace("''", "'");
    let requires_escape_clause = pattern.contains(ESCAPE_CHAR);
    EscapedPattern {
        pattern,
        requires_escape_clause,
    }
}
