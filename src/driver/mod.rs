//! Database driver boundary.
//!
//! The core consumes databases through these three object-safe traits;
//! [`sqlite`] provides the bundled reference adapter. Parameter and column
//! indexes are 1-based throughout, matching the positional markers produced
//! by the template parser.

pub mod sqlite;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::flavour::DbFlavour;
use crate::types::{SqlType, Value};
use crate::Result;

pub use sqlite::SqliteConnection;

/// A live database connection.
pub trait DbConnection {
    /// Prepare a statement for the given positional-parameter SQL text.
    fn prepare<'c>(&'c self, sql: &str) -> Result<Box<dyn DbStatement + 'c>>;

    /// Driver-reported database product name.
    fn product_name(&self) -> String;

    /// Dialect of this connection, derived from the product name.
    fn flavour(&self) -> DbFlavour {
        DbFlavour::from_product_name(&self.product_name())
    }

    fn auto_commit(&self) -> Result<bool>;

    fn set_auto_commit(&self, enabled: bool) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;
}

/// A prepared statement with indexed, typed parameter setters.
pub trait DbStatement {
    fn set_null(&mut self, index: usize) -> Result<()>;
    fn set_bool(&mut self, index: usize, value: bool) -> Result<()>;
    fn set_i8(&mut self, index: usize, value: i8) -> Result<()>;
    fn set_i16(&mut self, index: usize, value: i16) -> Result<()>;
    fn set_i32(&mut self, index: usize, value: i32) -> Result<()>;
    fn set_i64(&mut self, index: usize, value: i64) -> Result<()>;
    fn set_f32(&mut self, index: usize, value: f32) -> Result<()>;
    fn set_f64(&mut self, index: usize, value: f64) -> Result<()>;
    fn set_str(&mut self, index: usize, value: &str) -> Result<()>;
    fn set_bytes(&mut self, index: usize, value: &[u8]) -> Result<()>;
    /// Bind a UUID as the driver's native object. Dialects without a native
    /// UUID representation are handled before this call by the outbound
    /// conversion table.
    fn set_uuid(&mut self, index: usize, value: Uuid) -> Result<()>;
    fn set_date(&mut self, index: usize, value: NaiveDate) -> Result<()>;
    fn set_time(&mut self, index: usize, value: NaiveTime) -> Result<()>;
    fn set_datetime(&mut self, index: usize, value: NaiveDateTime) -> Result<()>;
    fn set_timestamp(&mut self, index: usize, value: DateTime<Utc>) -> Result<()>;

    /// Execute and obtain a row cursor.
    fn execute_query(&mut self) -> Result<Box<dyn DbCursor + '_>>;

    /// Execute and obtain the affected-row count.
    fn execute_update(&mut self) -> Result<u64>;

    /// Queue the currently bound parameter set as one batch entry.
    fn add_batch(&mut self) -> Result<()>;

    /// Run the queued batch, returning one affected-row count per entry in
    /// submission order.
    fn execute_batch(&mut self) -> Result<Vec<u64>>;
}

/// A cursor over a result set.
///
/// Getters return `Ok(None)` for SQL NULL; the null check is folded into
/// every read so primitive columns never surface a default-zero stand-in.
pub trait DbCursor {
    /// Move to the next row; `false` when the result set is exhausted.
    fn advance(&mut self) -> Result<bool>;

    fn column_count(&self) -> usize;
    fn column_label(&self, index: usize) -> Result<String>;
    fn column_type(&self, index: usize) -> Result<SqlType>;
    /// Driver-reported native type name, e.g. "uuid" or "binary_float".
    fn column_type_name(&self, index: usize) -> Result<String>;

    fn get_bool(&self, index: usize) -> Result<Option<bool>>;
    fn get_i32(&self, index: usize) -> Result<Option<i32>>;
    fn get_i64(&self, index: usize) -> Result<Option<i64>>;
    fn get_f32(&self, index: usize) -> Result<Option<f32>>;
    fn get_f64(&self, index: usize) -> Result<Option<f64>>;
    fn get_string(&self, index: usize) -> Result<Option<String>>;
    fn get_bytes(&self, index: usize) -> Result<Option<Vec<u8>>>;
    fn get_date(&self, index: usize) -> Result<Option<NaiveDate>>;
    fn get_time(&self, index: usize) -> Result<Option<NaiveTime>>;
    fn get_datetime(&self, index: usize) -> Result<Option<NaiveDateTime>>;
    fn get_timestamp(&self, index: usize) -> Result<Option<DateTime<Utc>>>;

    /// The stored value without interpretation, for dialects whose storage
    /// classes are looser than their declared types (SQLite dates arrive as
    /// either an integer or a string).
    fn get_raw(&self, index: usize) -> Result<Option<Value>>;
}
