/// SQL column type codes, mirroring the JDBC type enumeration.
///
/// Drivers report vendor extension types (UUID, Oracle's BINARY_FLOAT, ...)
/// through [`SqlType::Other`]; the inbound conversion table then falls back
/// to the driver-reported type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Array,
    BigInt,
    Binary,
    Bit,
    Blob,
    Boolean,
    Char,
    Clob,
    Date,
    Decimal,
    Double,
    Float,
    Integer,
    LongNVarChar,
    LongVarBinary,
    LongVarChar,
    NChar,
    NClob,
    Numeric,
    NVarChar,
    Real,
    RowId,
    SmallInt,
    SqlXml,
    Time,
    TimeWithTimezone,
    Timestamp,
    TimestampWithTimezone,
    TinyInt,
    VarBinary,
    VarChar,
    Other,
}

impl SqlType {
    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Array => "ARRAY",
            SqlType::BigInt => "BIGINT",
            SqlType::Binary => "BINARY",
            SqlType::Bit => "BIT",
            SqlType::Blob => "BLOB",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Char => "CHAR",
            SqlType::Clob => "CLOB",
            SqlType::Date => "DATE",
            SqlType::Decimal => "DECIMAL",
            SqlType::Double => "DOUBLE",
            SqlType::Float => "FLOAT",
            SqlType::Integer => "INTEGER",
            SqlType::LongNVarChar => "LONGNVARCHAR",
            SqlType::LongVarBinary => "LONGVARBINARY",
            SqlType::LongVarChar => "LONGVARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NClob => "NCLOB",
            SqlType::Numeric => "NUMERIC",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::Real => "REAL",
            SqlType::RowId => "ROWID",
            SqlType::SmallInt => "SMALLINT",
            SqlType::SqlXml => "SQLXML",
            SqlType::Time => "TIME",
            SqlType::TimeWithTimezone => "TIME_WITH_TIMEZONE",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
            SqlType::TinyInt => "TINYINT",
            SqlType::VarBinary => "VARBINARY",
            SqlType::VarChar => "VARCHAR",
            SqlType::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
