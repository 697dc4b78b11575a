//! Fallback coercion between a column's runtime value and the declared type
//! of the target component.
//!
//! The registry is keyed by target kind; each entry accepts the source
//! kinds that have a defined conversion. Malformed content in a convertible
//! kind is a [`RowkitError::ConversionParse`]; a combination with no rule at
//! all is [`RowkitError::Unsupported`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::{Result, RowkitError};
use super::value::{TargetKind, Value};

type Converter = fn(Value) -> Result<Value>;

static CONVERTERS: Lazy<HashMap<TargetKind, Converter>> = Lazy::new(|| {
    HashMap::from([
        (TargetKind::Uuid, convert_uuid as Converter),
        (TargetKind::Date, convert_date),
        (TargetKind::DateTime, convert_datetime),
        (TargetKind::Time, convert_time),
        (TargetKind::Timestamp, convert_timestamp),
        (TargetKind::Char, convert_char),
        (TargetKind::Int, convert_int),
        (TargetKind::Long, convert_long),
        (TargetKind::Bool, convert_bool),
        (TargetKind::Text, convert_text),
    ])
});

/// Coerce `value` into the target kind.
pub fn auto_convert(value: Value, target: TargetKind) -> Result<Value> {
    let converter = CONVERTERS.get(&target).ok_or_else(|| {
        RowkitError::Unsupported(format!(
            "cannot auto-convert from {:?} to {target:?}",
            value.kind()
        ))
    })?;
    converter(value)
}

fn unsupported(value: &Value, target: &str) -> RowkitError {
    RowkitError::Unsupported(format!(
        "cannot auto-convert from {:?} to {target}",
        value.kind()
    ))
}

fn convert_uuid(value: Value) -> Result<Value> {
    match value {
        Value::Uuid(_) => Ok(value),
        Value::Text(text) => Uuid::parse_str(&text).map(Value::Uuid).map_err(|e| {
            RowkitError::ConversionParse(format!("cannot parse '{text}' as a UUID: {e}"))
        }),
        Value::Bytes(bytes) => {
            let raw: [u8; 16] = bytes.as_slice().try_into().map_err(|_| {
                RowkitError::ConversionParse(format!(
                    "cannot build a UUID from {} bytes",
                    bytes.len()
                ))
            })?;
            Ok(Value::Uuid(Uuid::from_bytes(raw)))
        }
        other => Err(unsupported(&other, "Uuid")),
    }
}

fn convert_date(value: Value) -> Result<Value> {
    match value {
        Value::Date(_) => Ok(value),
        Value::Timestamp(ts) => Ok(Value::Date(ts.date_naive())),
        Value::DateTime(dt) => Ok(Value::Date(dt.date())),
        Value::Text(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|e| {
                RowkitError::ConversionParse(format!("cannot parse '{text}' as a date: {e}"))
            }),
        other => Err(unsupported(&other, "Date")),
    }
}

fn convert_datetime(value: Value) -> Result<Value> {
    match value {
        Value::DateTime(_) => Ok(value),
        Value::Timestamp(ts) => Ok(Value::DateTime(ts.naive_utc())),
        Value::Text(text) => parse_datetime_text(&text).map(Value::DateTime).ok_or_else(|| {
            RowkitError::ConversionParse(format!("cannot parse '{text}' as a date-time"))
        }),
        other => Err(unsupported(&other, "DateTime")),
    }
}

fn convert_time(value: Value) -> Result<Value> {
    match value {
        Value::Time(_) => Ok(value),
        Value::Timestamp(ts) => Ok(Value::Time(ts.naive_utc().time())),
        Value::Text(text) => NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M"))
            .map(Value::Time)
            .map_err(|e| {
                RowkitError::ConversionParse(format!("cannot parse '{text}' as a time: {e}"))
            }),
        // SQLite stores time-of-day as milliseconds since the epoch.
        Value::Int(millis) => time_from_epoch_millis(i64::from(millis)),
        Value::Long(millis) => time_from_epoch_millis(millis),
        other => Err(unsupported(&other, "Time")),
    }
}

fn convert_timestamp(value: Value) -> Result<Value> {
    match value {
        Value::Timestamp(_) => Ok(value),
        // A bare time is anchored to today's date, as an instant.
        Value::Time(time) => Ok(Value::Timestamp(
            Utc::now().date_naive().and_time(time).and_utc(),
        )),
        Value::DateTime(dt) => Ok(Value::Timestamp(dt.and_utc())),
        other => Err(unsupported(&other, "Timestamp")),
    }
}

fn convert_char(value: Value) -> Result<Value> {
    match value {
        Value::Char(_) => Ok(value),
        Value::Text(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(RowkitError::ConversionParse(format!(
                    "cannot convert '{text}' to a char (length != 1)"
                ))),
            }
        }
        other => Err(unsupported(&other, "Char")),
    }
}

fn convert_int(value: Value) -> Result<Value> {
    match value {
        Value::Int(_) => Ok(value),
        Value::Byte(v) => Ok(Value::Int(i32::from(v))),
        Value::Short(v) => Ok(Value::Int(i32::from(v))),
        Value::Long(v) => Ok(Value::Int(v as i32)),
        Value::Float(v) => Ok(Value::Int(v as i32)),
        Value::Double(v) => Ok(Value::Int(v as i32)),
        other => Err(unsupported(&other, "Int")),
    }
}

fn convert_long(value: Value) -> Result<Value> {
    match value {
        Value::Long(_) => Ok(value),
        Value::Byte(v) => Ok(Value::Long(i64::from(v))),
        Value::Short(v) => Ok(Value::Long(i64::from(v))),
        Value::Int(v) => Ok(Value::Long(i64::from(v))),
        Value::Float(v) => Ok(Value::Long(v as i64)),
        Value::Double(v) => Ok(Value::Long(v as i64)),
        other => Err(unsupported(&other, "Long")),
    }
}

fn convert_bool(value: Value) -> Result<Value> {
    match value {
        Value::Bool(_) => Ok(value),
        Value::Text(text) => match text.as_str() {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            _ => Err(RowkitError::ConversionParse(format!(
                "cannot convert '{text}' to a bool"
            ))),
        },
        Value::Byte(v) => Ok(Value::Bool(v != 0)),
        Value::Short(v) => Ok(Value::Bool(v != 0)),
        Value::Int(v) => Ok(Value::Bool(v != 0)),
        Value::Long(v) => Ok(Value::Bool(v != 0)),
        Value::Float(v) => Ok(Value::Bool(v != 0.0)),
        other => Err(unsupported(&other, "Bool")),
    }
}

fn convert_text(value: Value) -> Result<Value> {
    Ok(Value::Text(value.to_string()))
}

fn time_from_epoch_millis(millis: i64) -> Result<Value> {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| Value::Time(ts.naive_utc().time()))
        .ok_or_else(|| {
            RowkitError::ConversionParse(format!(
                "epoch value {millis} is out of range for a time"
            ))
        })
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    None
}
