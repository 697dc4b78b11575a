//! Per-dialect encode/decode strategies.
//!
//! The cells of the conversion matrix that differ per database product are
//! bundled here, one function bundle per flavour, instead of branching on
//! the flavour inside every converter.

use uuid::Uuid;

use crate::driver::{DbCursor, DbStatement};
use crate::flavour::DbFlavour;
use crate::Result;
use super::sqlite_dates::read_sqlite_date;
use super::value::Value;

/// Encode/decode bundle for one database dialect.
pub struct DialectCodec {
    pub flavour: DbFlavour,
    /// How a UUID parameter reaches the wire.
    pub bind_uuid: fn(&mut dyn DbStatement, usize, Uuid) -> Result<()>,
    /// How a DATE column is read back.
    pub read_date: fn(&dyn DbCursor, usize) -> Result<Value>,
}

/// Look up the codec for a flavour.
pub fn dialect(flavour: DbFlavour) -> &'static DialectCodec {
    match flavour {
        DbFlavour::MySql => &MYSQL,
        DbFlavour::Oracle => &ORACLE,
        DbFlavour::Sqlite => &SQLITE,
        DbFlavour::PostgreSql => &POSTGRESQL,
        DbFlavour::MsSqlServer => &MSSQL,
        DbFlavour::Unknown => &UNKNOWN,
    }
}

fn bind_uuid_native(stmt: &mut dyn DbStatement, index: usize, value: Uuid) -> Result<()> {
    stmt.set_uuid(index, value)
}

// MySQL has no native UUID column type.
fn bind_uuid_text(stmt: &mut dyn DbStatement, index: usize, value: Uuid) -> Result<()> {
    stmt.set_str(index, &value.to_string())
}

// Oracle stores UUIDs in RAW(16) columns, big-endian.
fn bind_uuid_raw(stmt: &mut dyn DbStatement, index: usize, value: Uuid) -> Result<()> {
    stmt.set_bytes(index, value.as_bytes())
}

fn read_date_native(cursor: &dyn DbCursor, index: usize) -> Result<Value> {
    Ok(cursor
        .get_date(index)?
        .map(Value::Date)
        .unwrap_or(Value::Null))
}

static POSTGRESQL: DialectCodec = DialectCodec {
    flavour: DbFlavour::PostgreSql,
    bind_uuid: bind_uuid_native,
    read_date: read_date_native,
};

static MYSQL: DialectCodec = DialectCodec {
    flavour: DbFlavour::MySql,
    bind_uuid: bind_uuid_text,
    read_date: read_date_native,
};

static SQLITE: DialectCodec = DialectCodec {
    flavour: DbFlavour::Sqlite,
    bind_uuid: bind_uuid_native,
    read_date: read_sqlite_date,
};

static ORACLE: DialectCodec = DialectCodec {
    flavour: DbFlavour::Oracle,
    bind_uuid: bind_uuid_raw,
    read_date: read_date_native,
};

static MSSQL: DialectCodec = DialectCodec {
    flavour: DbFlavour::MsSqlServer,
    bind_uuid: bind_uuid_native,
    read_date: read_date_native,
};

static UNKNOWN: DialectCodec = DialectCodec {
    flavour: DbFlavour::Unknown,
    bind_uuid: bind_uuid_native,
    read_date: read_date_native,
};
