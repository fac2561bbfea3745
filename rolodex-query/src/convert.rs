//! Conversions between client JSON values and stored cell values.

use chrono::{DateTime, Datelike, NaiveDate};
use serde_json::Value as JsonValue;
use url::Url;

use crate::attributes::{AttributeDescriptor, PrimitiveKind, ValueFormat};
use crate::error::{QueryError, QueryResult};
use crate::types::Value;

const FILE_SCHEME: &str = "file://";

/// Convert a `file://` URI to a local path. Other strings are returned as is.
pub fn uri_to_path(uri: &str) -> String {
    if !uri.starts_with(FILE_SCHEME) {
        return uri.to_string();
    }
    match Url::parse(uri).ok().and_then(|url| url.to_file_path().ok()) {
        Some(path) => path.to_string_lossy().into_owned(),
        None => uri[FILE_SCHEME.len()..].to_string(),
    }
}

/// Convert a stored local path back to a `file://` URI.
pub fn path_to_uri(path: &str) -> String {
    if path.starts_with('/') {
        match Url::from_file_path(path) {
            Ok(url) => url.to_string(),
            Err(()) => format!("{}{}", FILE_SCHEME, path),
        }
    } else {
        path.to_string()
    }
}

/// Encode a date as the stored `yyyymmdd` integer.
pub fn date_to_int(date: NaiveDate) -> i64 {
    date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
}

/// Decode a stored `yyyymmdd` integer.
pub fn int_to_date(value: i64) -> Option<NaiveDate> {
    let year = i32::try_from(value / 10_000).ok()?;
    let month = u32::try_from(value / 100 % 100).ok()?;
    let day = u32::try_from(value % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn mismatch(descriptor: &AttributeDescriptor, expected: &str, got: &JsonValue) -> QueryError {
    QueryError::type_mismatch(format!(
        "Expected {} for column {}, got {}",
        expected, descriptor.column, got
    ))
    .with_attribute(descriptor.column)
}

/// A float without a fractional part that fits an `i64`.
fn whole_float_to_long(f: f64) -> Option<i64> {
    // NaN and infinities have a NaN fractional part
    if f.fract() != 0.0 {
        return None;
    }
    i64::try_from(f as i128).ok()
}

fn to_long(descriptor: &AttributeDescriptor, json: &JsonValue) -> QueryResult<i64> {
    match (json, descriptor.format) {
        (JsonValue::Number(n), _) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_float_to_long))
            .ok_or_else(|| mismatch(descriptor, "an integer", json)),
        (JsonValue::String(s), ValueFormat::Date) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(date_to_int)
            .map_err(|_| mismatch(descriptor, "a YYYY-MM-DD date", json)),
        (JsonValue::String(s), ValueFormat::Timestamp) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.timestamp())
            .map_err(|_| mismatch(descriptor, "an RFC 3339 timestamp", json)),
        (JsonValue::String(s), _) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| mismatch(descriptor, "an integer", json)),
        _ => Err(mismatch(descriptor, "an integer", json)),
    }
}

/// Convert a client match value to the cell value stored for `descriptor`.
pub fn to_store_value(descriptor: &AttributeDescriptor, json: &JsonValue) -> QueryResult<Value> {
    match descriptor.kind {
        PrimitiveKind::Boolean => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(descriptor, "a boolean", json)),
        PrimitiveKind::Long => to_long(descriptor, json).map(Value::Int),
        PrimitiveKind::String => {
            let text = match json {
                JsonValue::String(s) => s.clone(),
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                _ => return Err(mismatch(descriptor, "a string", json)),
            };
            Ok(match descriptor.format {
                ValueFormat::Uri => Value::Text(uri_to_path(&text)),
                _ => Value::Text(text),
            })
        }
    }
}
