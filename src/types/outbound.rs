//! Outbound conversion: [`Value`] to a prepared-statement parameter.

use crate::driver::DbStatement;
use crate::flavour::DbFlavour;
use crate::Result;
use super::dialect::dialect;
use super::value::Value;

/// Bind a value to the 1-based parameter slot, applying dialect-specific
/// encoding where representations differ across products.
pub fn bind_value(
    stmt: &mut dyn DbStatement,
    index: usize,
    value: &Value,
    flavour: DbFlavour,
) -> Result<()> {
    match value {
        Value::Null => stmt.set_null(index),
        Value::Bool(v) => stmt.set_bool(index, *v),
        Value::Byte(v) => stmt.set_i8(index, *v),
        Value::Short(v) => stmt.set_i16(index, *v),
        Value::Int(v) => stmt.set_i32(index, *v),
        Value::Long(v) => stmt.set_i64(index, *v),
        Value::Float(v) => stmt.set_f32(index, *v),
        Value::Double(v) => stmt.set_f64(index, *v),
        Value::Char(v) => stmt.set_str(index, &v.to_string()),
        Value::Text(v) => stmt.set_str(index, v),
        Value::Bytes(v) => stmt.set_bytes(index, v),
        Value::Uuid(v) => (dialect(flavour).bind_uuid)(stmt, index, *v),
        Value::Date(v) => stmt.set_date(index, *v),
        Value::Time(v) => stmt.set_time(index, *v),
        Value::DateTime(v) => stmt.set_datetime(index, *v),
        Value::Timestamp(v) => stmt.set_timestamp(index, *v),
    }
}
