pub mod driver;
pub mod flavour;
pub mod mapper;
pub mod metadata;
pub mod query;
pub mod types;

use thiserror::Error;

/// Error taxonomy for template parsing, type conversion, mapping and execution.
///
/// All variants are fatal and non-retriable as far as this crate is concerned;
/// retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum RowkitError {
    /// Malformed template, or a bind-time reference to a name that is not a
    /// template token.
    #[error("SQL template parse error: {0}")]
    Parse(String),

    /// Target type cannot be constructed from the supplied columns.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// No conversion rule exists for the requested type combination.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Input value was of a convertible kind but had malformed content,
    /// e.g. a string that is not a valid UUID. Distinguished from
    /// [`RowkitError::Unsupported`] so callers can tell bad data from a
    /// missing feature.
    #[error("Conversion error: {0}")]
    ConversionParse(String),

    /// `query_single` matched more than one row.
    #[error("Expected a single result but found {0}")]
    SingleResultExpected(usize),

    /// Transaction control failed (commit/rollback issued outside a
    /// transaction, driver refused a mode change, ...).
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The user block failed and the subsequent rollback failed too. The
    /// original error is preserved; the rollback failure travels with it.
    #[error("{source} (rollback also failed: {rollback})")]
    RollbackFailed {
        source: Box<RowkitError>,
        rollback: Box<RowkitError>,
    },

    /// SQLite driver error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, RowkitError>;

pub use flavour::DbFlavour;
pub use mapper::{Component, DataClassMapper, FromRow, MapperRegistry, RecordMapper, RowMapper};
pub use metadata::Field;
pub use query::{with_transaction, Args, Query, QueryRunner};
pub use types::{SqlType, TargetKind, Value};
