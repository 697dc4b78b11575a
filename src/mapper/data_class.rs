use std::collections::HashMap;
use std::marker::PhantomData;

use crate::driver::DbCursor;
use crate::metadata::Field;
use crate::types::{auto_convert, Value};
use crate::{Result, RowkitError};
use super::{normalised_column_name, read_columns, ColumnValue, FromRow, RowMapper};

/// Automatic mapper for data-class style targets: components matched by
/// normalised name, nullable components defaulting to `None`.
///
/// A result column that matches no component is silently ignored, but
/// supplying more distinct columns than the type has components is an error
/// naming the surplus columns, and a required component left without a
/// binding is an error naming every missing component.
pub struct DataClassMapper<T: FromRow> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRow> DataClassMapper<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn create(&self, columns: Vec<ColumnValue>) -> Result<T> {
        let components = T::components();
        let index: HashMap<String, usize> = components
            .iter()
            .enumerate()
            .map(|(position, component)| (normalised_column_name(component.name), position))
            .collect();

        if columns.len() > components.len() {
            let mut surplus: Vec<&str> = columns
                .iter()
                .filter(|column| !index.contains_key(&normalised_column_name(&column.name)))
                .map(|column| column.name.as_str())
                .collect();
            if surplus.is_empty() {
                surplus = columns.iter().map(|column| column.name.as_str()).collect();
            }
            return Err(RowkitError::Mapping(format!(
                "too many columns supplied for {}: [{}] have no matching component",
                std::any::type_name::<T>(),
                surplus.join(", ")
            )));
        }

        let mut values = vec![Value::Null; components.len()];
        let mut bound = vec![false; components.len()];
        for column in columns {
            let Some(&position) = index.get(&normalised_column_name(&column.name)) else {
                continue;
            };
            let component = &components[position];
            values[position] = if column.value.is_null() {
                Value::Null
            } else if column.value.kind() == Some(component.kind) {
                column.value
            } else {
                auto_convert(column.value, component.kind)?
            };
            bound[position] = true;
        }

        let missing: Vec<&str> = components
            .iter()
            .enumerate()
            .filter(|(position, component)| !component.nullable && !bound[*position])
            .map(|(_, component)| component.name)
            .collect();
        if !missing.is_empty() {
            return Err(RowkitError::Mapping(format!(
                "the following components are non-optional and missing: [{}]",
                missing.join(", ")
            )));
        }

        T::construct(values)
    }
}

impl<T: FromRow> Default for DataClassMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRow> RowMapper<T> for DataClassMapper<T> {
    fn map_row(&self, cursor: &dyn DbCursor, fields: &[(String, Field)]) -> Result<T> {
        self.create(read_columns(cursor, fields)?)
    }
}
