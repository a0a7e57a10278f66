//! Textual literal → typed value coercion.
//!
//! Coercion is always driven by the declared property type: `'5'` compared
//! against an integer property becomes `Integer(5)`, `5` compared against a
//! text property becomes `Text("5")`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::errors::ResolveError;
use super::{PropertyType, TypedValue};

/// Date/time layouts accepted after RFC 3339 has been tried.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date or date/time lexeme into an instant.
///
/// Offsets are normalized to UTC; lexemes without an offset are taken as-is.
/// A bare date means midnight.
pub fn parse_instant(text: &str) -> Result<NaiveDateTime, ResolveError> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_utc());
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }

    Err(ResolveError::coercion(
        text,
        PropertyType::Timestamp,
        "not an ISO-8601 date or date/time",
    ))
}

/// Coerce literal text into `property_type`.
pub fn coerce_literal(text: &str, property_type: &PropertyType) -> Result<TypedValue, ResolveError> {
    log::trace!("coerce_literal: `{}` as {}", text, property_type);

    match property_type {
        PropertyType::Text => Ok(TypedValue::Text(text.to_string())),
        PropertyType::Integer => text
            .trim()
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|e| ResolveError::coercion(text, property_type, e)),
        PropertyType::Float => {
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|e| ResolveError::coercion(text, property_type, e))?;
            if !value.is_finite() {
                return Err(ResolveError::coercion(text, property_type, "value is not finite"));
            }
            Ok(TypedValue::Float(value))
        }
        PropertyType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(TypedValue::Boolean(true)),
            "false" => Ok(TypedValue::Boolean(false)),
            _ => Err(ResolveError::coercion(
                text,
                property_type,
                "expected `true` or `false`",
            )),
        },
        PropertyType::Timestamp => parse_instant(text).map(TypedValue::Timestamp),
        PropertyType::Entity(_) => Err(ResolveError::coercion(
            text,
            property_type,
            "associations cannot be compared with a literal",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_integer_coercion_trims() {
        assert_eq!(
            coerce_literal(" 42 ", &PropertyType::Integer),
            Ok(TypedValue::Integer(42))
        );
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let err = coerce_literal("4.2", &PropertyType::Integer).unwrap_err();
        assert!(matches!(err, ResolveError::TypeCoercion { ref expected, .. } if expected == "integer"));
    }

    #[test]
    fn test_text_keeps_number_lexeme() {
        assert_eq!(
            coerce_literal("5", &PropertyType::Text),
            Ok(TypedValue::Text("5".to_string()))
        );
    }

    #[test]
    fn test_float_and_boolean() {
        assert_eq!(
            coerce_literal("2.5", &PropertyType::Float),
            Ok(TypedValue::Float(2.5))
        );
        assert!(coerce_literal("NaN", &PropertyType::Float).is_err());
        assert_eq!(
            coerce_literal("TRUE", &PropertyType::Boolean),
            Ok(TypedValue::Boolean(true))
        );
        assert!(coerce_literal("yes", &PropertyType::Boolean).is_err());
    }

    #[test]
    fn test_entity_is_not_coercible() {
        assert!(coerce_literal("1", &PropertyType::Entity("Address".into())).is_err());
    }

    #[test]
    fn test_parse_instant_forms() {
        assert_eq!(parse_instant("2020-01-31").unwrap(), ymd_hms(2020, 1, 31, 0, 0, 0));
        assert_eq!(
            parse_instant("2020-01-31T10:15:30").unwrap(),
            ymd_hms(2020, 1, 31, 10, 15, 30)
        );
        assert_eq!(
            parse_instant("2020-01-31 10:15:30").unwrap(),
            ymd_hms(2020, 1, 31, 10, 15, 30)
        );
        assert_eq!(
            parse_instant("2020-01-31T10:15:30+02:00").unwrap(),
            ymd_hms(2020, 1, 31, 8, 15, 30)
        );
        assert_eq!(
            parse_instant("2020-01-31T10:15:30Z").unwrap(),
            ymd_hms(2020, 1, 31, 10, 15, 30)
        );
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(parse_instant("31/01/2020").is_err());
        assert!(parse_instant("2020-02-30").is_err());
    }
}
