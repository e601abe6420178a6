//! Converts raw leaf-rule values into typed constants.
//!
//! Multi-valued operators tokenize delimited strings (commas, brackets,
//! newlines); single-valued operators take the whole trimmed raw value as one
//! token. Conversion is locale-aware; unparseable date tokens become null
//! constants (which compare false at evaluation), while unparseable
//! numeric and boolean tokens fail compilation.

use crate::types::{CompileError, CompileOptions, DataType, FieldValue, RuleValue};

/// Produce the typed constants for a leaf rule.
pub(crate) fn coerce(
    declared: DataType,
    raw: &RuleValue,
    multi: bool,
    options: &CompileOptions,
) -> Result<Vec<FieldValue>, CompileError> {
    let tokens = tokenize(raw, multi);
    let mut constants = Vec::with_capacity(tokens.len());
    for token in &tokens {
        constants.push(convert(declared, token, options)?);
    }
    if multi && declared == DataType::String {
        dedup_preserving_order(&mut constants);
    }
    Ok(constants)
}

fn tokenize(raw: &RuleValue, multi: bool) -> Vec<String> {
    match raw {
        RuleValue::Many(items) if multi => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        // A list handed to a single-valued operator: only the first entry
        // counts.
        RuleValue::Many(items) => items
            .first()
            .map(|s| s.trim().to_owned())
            .into_iter()
            .collect(),
        RuleValue::Single(s) if multi => split_delimited(s),
        RuleValue::Single(s) => vec![s.trim().to_owned()],
    }
}

fn split_delimited(s: &str) -> Vec<String> {
    s.split(['[', ']', ',', '\r', '\n'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn convert(
    declared: DataType,
    token: &str,
    options: &CompileOptions,
) -> Result<FieldValue, CompileError> {
    let locale = options.locale;
    match declared {
        DataType::String => Ok(FieldValue::String(token.to_owned())),
        DataType::Integer => locale.parse_i64(token).map(FieldValue::Int).ok_or_else(|| {
            CompileError::MalformedValue {
                detail: format!("cannot parse '{token}' as integer"),
            }
        }),
        DataType::Double => locale
            .parse_f64(token)
            .map(FieldValue::Float)
            .ok_or_else(|| CompileError::MalformedValue {
                detail: format!("cannot parse '{token}' as double"),
            }),
        DataType::Boolean => locale
            .parse_bool(token)
            .map(FieldValue::Bool)
            .ok_or_else(|| CompileError::MalformedValue {
                detail: format!("cannot parse '{token}' as boolean"),
            }),
        DataType::DateTime => Ok(locale
            .parse_datetime(token, options.parse_dates_as_utc)
            .map_or(FieldValue::Null, FieldValue::DateTime)),
    }
}

fn dedup_preserving_order(constants: &mut Vec<FieldValue>) {
    let mut seen: Vec<FieldValue> = Vec::new();
    constants.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(c.clone());
            true
        }
    });
}
