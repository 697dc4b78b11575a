//! Result-row to object mapping.
//!
//! A target type describes its canonical constructor through [`FromRow`]
//! (usually generated with [`row_record!`]); the two mapper strategies match
//! result columns to constructor components by normalised name and build one
//! instance per row.

pub mod data_class;
pub mod record;
pub mod registry;

use crate::driver::DbCursor;
use crate::metadata::Field;
use crate::types::{read_column, TargetKind, Value};
use crate::Result;

pub use data_class::DataClassMapper;
pub use record::RecordMapper;
pub use registry::MapperRegistry;

/// Maps the current cursor row to an instance of `T`.
///
/// Implemented by the provided strategies and by any
/// `Fn(&dyn DbCursor, &[(String, Field)]) -> Result<T>` closure, so callers
/// can hand-roll a mapper where the automatic matching does not fit.
pub trait RowMapper<T>: Send + Sync {
    fn map_row(&self, cursor: &dyn DbCursor, fields: &[(String, Field)]) -> Result<T>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&dyn DbCursor, &[(String, Field)]) -> Result<T> + Send + Sync,
{
    fn map_row(&self, cursor: &dyn DbCursor, fields: &[(String, Field)]) -> Result<T> {
        self(cursor, fields)
    }
}

/// One constructor component of a mappable type.
#[derive(Debug, Clone, Copy)]
pub struct Component {
    /// Declared field name; matched against normalised column labels.
    pub name: &'static str,
    pub kind: TargetKind,
    /// Nullable components accept SQL NULL and default to `None` when no
    /// column matches.
    pub nullable: bool,
}

/// Canonical-constructor description of a mappable type.
///
/// `construct` receives one value per component, in declaration order, with
/// [`Value::Null`] standing in for absent nullable components.
pub trait FromRow: Sized {
    fn components() -> &'static [Component];

    fn construct(values: Vec<Value>) -> Result<Self>;
}

/// A column label paired with the decoded value of the current row.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub name: String,
    pub value: Value,
}

/// Decode every column of the current row through the inbound conversion
/// table.
pub(crate) fn read_columns(
    cursor: &dyn DbCursor,
    fields: &[(String, Field)],
) -> Result<Vec<ColumnValue>> {
    fields
        .iter()
        .map(|(label, field)| {
            Ok(ColumnValue {
                name: label.clone(),
                value: read_column(cursor, field)?,
            })
        })
        .collect()
}

/// Normalise a column or component name: lowercase, underscores and dashes
/// removed.
pub fn normalised_column_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '-'], "")
}

/// Define a plain struct together with its [`FromRow`] implementation.
///
/// `Option<T>` fields are nullable and default to `None` when no column
/// matches; all other fields are required.
///
/// ```
/// rowkit::row_record! {
///     #[derive(Debug, PartialEq)]
///     pub struct SuperHero {
///         pub id: uuid::Uuid,
///         pub name: String,
///         pub email: Option<String>,
///         pub age: Option<i32>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! row_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($(#[$fmeta])* $fvis $field: $ty,)*
        }

        impl $crate::mapper::FromRow for $name {
            fn components() -> &'static [$crate::mapper::Component] {
                const COMPONENTS: &[$crate::mapper::Component] = &[
                    $($crate::mapper::Component {
                        name: stringify!($field),
                        kind: <$ty as $crate::types::FromValue>::KIND,
                        nullable: <$ty as $crate::types::FromValue>::NULLABLE,
                    },)*
                ];
                COMPONENTS
            }

            fn construct(
                values: ::std::vec::Vec<$crate::types::Value>,
            ) -> $crate::Result<Self> {
                let mut values = values.into_iter();
                Ok(Self {
                    $($field: {
                        let value = values.next().unwrap_or($crate::types::Value::Null);
                        <$ty as $crate::types::FromValue>::from_value(value).map_err(|e| {
                            $crate::RowkitError::Mapping(format!(
                                "component '{}': {e}",
                                stringify!($field)
                            ))
                        })?
                    },)*
                })
            }
        }
    };
}
