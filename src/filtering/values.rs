use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_orm::Value;
use uuid::Uuid;

use super::lookup::{Lookup, Operator, Transform};
use crate::{config::FilterConfig, errors::FilterError, schema::FieldKind};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A query-string value converted for its lookup
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Single(Value),
    /// Text-matching lookups keep the raw string
    Pattern(String),
    /// `in` lookups
    List(Vec<Value>),
    /// `range` lookups, inclusive
    Range(Value, Value),
    /// `isnull` lookups
    Flag(bool),
}

/// Parse a calendar day in `YYYY-MM-DD` form
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Parse a timestamp; offsets are normalised to UTC and a bare date means midnight
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| parse_date(raw).and_then(|date| date.and_hms_opt(0, 0, 0)))
}

/// Parse an instant for a timezone-aware column; input without an offset is taken as UTC
#[must_use]
pub fn parse_datetime_utc(raw: &str) -> Option<DateTime<Utc>> {
    parse_datetime(raw).map(|naive| naive.and_utc())
}

/// Parse a boolean the way HTML forms and query strings usually spell it
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Convert a raw query-string value for `lookup` on a field of `kind`.
///
/// # Errors
///
/// Returns `FilterError::InvalidValue` when the value (or one list item) does
/// not parse as the field's type, or a `range` does not have exactly two bounds.
pub fn coerce(
    param: &str,
    raw: &str,
    kind: &FieldKind,
    lookup: Lookup,
    config: &FilterConfig,
) -> Result<FilterValue, FilterError> {
    let day_kind;
    let kind = match lookup.transform {
        Some(Transform::Date) => {
            day_kind = FieldKind::Date;
            &day_kind
        }
        None => kind,
    };

    match lookup.operator {
        Operator::IsNull => parse_bool(raw)
            .map(FilterValue::Flag)
            .ok_or_else(|| FilterError::invalid_value(param, raw, "expected a boolean")),
        Operator::In => config
            .split_list(raw)
            .into_iter()
            .map(|item| coerce_scalar(param, item, kind))
            .collect::<Result<Vec<_>, _>>()
            .map(FilterValue::List),
        Operator::Range => match config.split_list(raw).as_slice() {
            [low, high] => Ok(FilterValue::Range(
                coerce_scalar(param, low, kind)?,
                coerce_scalar(param, high, kind)?,
            )),
            _ => Err(FilterError::invalid_value(
                param,
                raw,
                "range needs exactly two bounds",
            )),
        },
        operator if operator.is_text_match() => Ok(FilterValue::Pattern(raw.to_string())),
        _ => coerce_scalar(param, raw, kind).map(FilterValue::Single),
    }
}

fn coerce_scalar(param: &str, raw: &str, kind: &FieldKind) -> Result<Value, FilterError> {
    let invalid = |reason: String| FilterError::invalid_value(param, raw, reason);
    let trimmed = raw.trim();

    match kind {
        FieldKind::Text | FieldKind::Other => Ok(Value::from(raw.to_string())),
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| invalid(e.to_string())),
        FieldKind::Float => trimmed
            .parse::<f64>()
            .map(Value::from)
            .map_err(|e| invalid(e.to_string())),
        FieldKind::Boolean => parse_bool(trimmed)
            .map(Value::from)
            .ok_or_else(|| invalid("expected a boolean".to_string())),
        FieldKind::Uuid => Uuid::parse_str(trimmed)
            .map(Value::from)
            .map_err(|e| invalid(e.to_string())),
        FieldKind::Date => parse_date(trimmed)
            .map(Value::from)
            .ok_or_else(|| invalid(format!("expected a date in {DATE_FORMAT} form"))),
        FieldKind::DateTime => parse_datetime(trimmed)
            .map(Value::from)
            .ok_or_else(|| invalid("expected a date or datetime".to_string())),
        FieldKind::DateTimeTz => parse_datetime_utc(trimmed)
            .map(Value::from)
            .ok_or_else(|| invalid("expected a date or datetime".to_string())),
        FieldKind::Relation(relation) => coerce_scalar(param, raw, &relation.key_kind),
    }
}
