//! Inbound conversion: result-set column to [`Value`].
//!
//! Dispatch is primarily on the standard type code; vendor extension types
//! surface as [`SqlType::Other`] and are resolved by the driver-reported
//! type name instead.

use uuid::Uuid;

use crate::driver::DbCursor;
use crate::metadata::Field;
use crate::{Result, RowkitError};
use super::dialect::dialect;
use super::sql_type::SqlType;
use super::value::Value;

/// Read one column of the current row as a dynamically typed value.
///
/// SQL NULL yields [`Value::Null`] for every rule.
pub fn read_column(cursor: &dyn DbCursor, field: &Field) -> Result<Value> {
    let index = field.column_index;
    match field.sql_type {
        SqlType::BigInt => Ok(opt(cursor.get_i64(index)?.map(Value::Long))),
        SqlType::Binary | SqlType::Blob | SqlType::LongVarBinary | SqlType::VarBinary => {
            Ok(opt(cursor.get_bytes(index)?.map(Value::Bytes)))
        }
        SqlType::Bit | SqlType::Boolean => Ok(opt(cursor.get_bool(index)?.map(Value::Bool))),
        SqlType::Char
        | SqlType::NChar
        | SqlType::Clob
        | SqlType::LongNVarChar
        | SqlType::LongVarChar
        | SqlType::NClob
        | SqlType::NVarChar
        | SqlType::RowId
        | SqlType::SqlXml
        | SqlType::VarChar => Ok(opt(cursor.get_string(index)?.map(Value::Text))),
        SqlType::Date => (dialect(field.db_flavour).read_date)(cursor, index),
        SqlType::Decimal | SqlType::Float | SqlType::Numeric | SqlType::Real => {
            Ok(opt(cursor.get_f32(index)?.map(Value::Float)))
        }
        SqlType::Double => Ok(opt(cursor.get_f64(index)?.map(Value::Double))),
        SqlType::Integer | SqlType::SmallInt | SqlType::TinyInt => {
            Ok(opt(cursor.get_i32(index)?.map(Value::Int)))
        }
        SqlType::Time | SqlType::TimeWithTimezone => {
            Ok(opt(cursor.get_time(index)?.map(Value::Time)))
        }
        SqlType::Timestamp | SqlType::TimestampWithTimezone => {
            read_timestamp(cursor, index, &field.type_name)
        }
        // Vendor extension channel: resolve by the reported type name.
        _ => match field.type_name.to_lowercase().as_str() {
            "uuid" => match cursor.get_string(index)? {
                None => Ok(Value::Null),
                Some(text) => Uuid::parse_str(&text).map(Value::Uuid).map_err(|e| {
                    RowkitError::ConversionParse(format!("cannot parse '{text}' as a UUID: {e}"))
                }),
            },
            // oracle types
            "binary_float" => Ok(opt(cursor.get_f32(index)?.map(Value::Float))),
            "binary_double" => Ok(opt(cursor.get_f64(index)?.map(Value::Double))),
            other => Err(RowkitError::Unsupported(format!(
                "conversion of column {index} from type {} ('{other}') is not supported",
                field.sql_type
            ))),
        },
    }
}

// Some drivers report date-only columns through the TIMESTAMP code with a
// native type name of "DATE"; those become a local date-time, not an instant.
fn read_timestamp(cursor: &dyn DbCursor, index: usize, type_name: &str) -> Result<Value> {
    if type_name.eq_ignore_ascii_case("date") {
        Ok(opt(cursor.get_datetime(index)?.map(Value::DateTime)))
    } else {
        Ok(opt(cursor.get_timestamp(index)?.map(Value::Timestamp)))
    }
}

fn opt(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}
