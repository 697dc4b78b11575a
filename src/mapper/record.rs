use std::collections::HashMap;
use std::marker::PhantomData;

use crate::driver::DbCursor;
use crate::metadata::Field;
use crate::types::{auto_convert, Value};
use crate::{Result, RowkitError};
use super::{normalised_column_name, read_columns, ColumnValue, FromRow, RowMapper};

/// Automatic mapper for record-style targets: fixed arity, all-or-nothing.
///
/// Columns are matched by normalised name against the components in
/// declaration order; extra columns are ignored, a missing or SQL-NULL
/// column for a non-nullable component is fatal, and nullable components
/// are simply left `None`.
pub struct RecordMapper<T: FromRow> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRow> RecordMapper<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn create(&self, columns: Vec<ColumnValue>) -> Result<T> {
        let components = T::components();
        let by_name: HashMap<String, ColumnValue> = columns
            .into_iter()
            .map(|column| (normalised_column_name(&column.name), column))
            .collect();

        let mut values = vec![Value::Null; components.len()];
        let mut missing = Vec::new();
        for (position, component) in components.iter().enumerate() {
            let name = normalised_column_name(component.name);
            let Some(column) = by_name.get(&name) else {
                if !component.nullable {
                    missing.push(name);
                }
                continue;
            };
            values[position] = if column.value.is_null() {
                if !component.nullable {
                    return Err(RowkitError::Mapping(format!(
                        "the record component '{name}' cannot be null"
                    )));
                }
                Value::Null
            } else if column.value.kind() == Some(component.kind) {
                column.value.clone()
            } else {
                auto_convert(column.value.clone(), component.kind)?
            };
        }
        if !missing.is_empty() {
            return Err(RowkitError::Mapping(format!(
                "the following non-nullable record components are missing: [{}]",
                missing.join(", ")
            )));
        }

        T::construct(values)
    }
}

impl<T: FromRow> Default for RecordMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRow> RowMapper<T> for RecordMapper<T> {
    fn map_row(&self, cursor: &dyn DbCursor, fields: &[(String, Field)]) -> Result<T> {
        self.create(read_columns(cursor, fields)?)
    }
}
