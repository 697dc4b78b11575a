use crate::driver::DbCursor;
use crate::flavour::DbFlavour;
use crate::types::SqlType;
use crate::Result;

/// Descriptor of one result-set column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// 1-based column index, stable for the lifetime of one result set.
    pub column_index: usize,
    pub sql_type: SqlType,
    /// Native type name as reported by the driver, consulted when
    /// `sql_type` is the generic [`SqlType::Other`] channel.
    pub type_name: String,
    pub db_flavour: DbFlavour,
}

/// Read the column descriptors of a result set, in result-set order.
///
/// Only metadata is touched; no row data is consumed.
pub fn extract_fields(
    cursor: &dyn DbCursor,
    flavour: DbFlavour,
) -> Result<Vec<(String, Field)>> {
    (1..=cursor.column_count())
        .map(|index| {
            Ok((
                cursor.column_label(index)?,
                Field {
                    column_index: index,
                    sql_type: cursor.column_type(index)?,
                    type_name: cursor.column_type_name(index)?,
                    db_flavour: flavour,
                },
            ))
        })
        .collect()
}
