use std::collections::HashMap;

use tracing::{debug, warn};

use crate::driver::{DbConnection, DbStatement};
use crate::flavour::DbFlavour;
use crate::mapper::{FromRow, MapperRegistry, RowMapper};
use crate::metadata::extract_fields;
use crate::types::{bind_value, Value};
use crate::{Result, RowkitError};
use super::template::Query;

/// Named arguments for a query or statement.
pub type Args = HashMap<String, Value>;

/// Extracts one named parameter from a domain object.
pub type ArgAccessor<'a, T> = (&'a str, &'a dyn Fn(&T) -> Value);

/// Build an [`Args`] map from `name => value` pairs.
///
/// ```
/// use rowkit::args;
/// let args = args! { "fromAge" => 86, "toAge" => 89 };
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::query::Args::new() };
    ($($name:expr => $value:expr),* $(,)?) => {{
        let mut args = $crate::query::Args::new();
        $(args.insert(($name).to_string(), $crate::types::Value::from($value));)*
        args
    }};
}

/// Execution facade: parse, prepare, bind, execute, map.
///
/// Owns the mapper registry it resolves automatic mappers from. Every
/// operation re-parses its template and re-derives metadata; statements and
/// cursors are closed on every exit path by scope.
#[derive(Default)]
pub struct QueryRunner {
    registry: MapperRegistry,
}

impl QueryRunner {
    pub fn new() -> Self {
        Self {
            registry: MapperRegistry::new(),
        }
    }

    /// Build a runner around an existing registry, e.g. one pre-populated
    /// with custom mappers.
    pub fn with_registry(registry: MapperRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    /// Run a query and map every row to `T` with its automatic mapper.
    pub fn query<T>(&self, conn: &dyn DbConnection, sql: &str, args: &Args) -> Result<Vec<T>>
    where
        T: FromRow + 'static,
    {
        let mapper = self.registry.get::<T>();
        self.query_with(conn, sql, mapper.as_ref(), args)
    }

    /// Run a query with an explicit mapper.
    pub fn query_with<T>(
        &self,
        conn: &dyn DbConnection,
        sql: &str,
        mapper: &dyn RowMapper<T>,
        args: &Args,
    ) -> Result<Vec<T>> {
        let query = parse_checked(sql)?;
        let flavour = conn.flavour();
        let mut stmt = conn.prepare(&query.sql)?;
        bind_args(stmt.as_mut(), &query, args, flavour)?;
        debug!(sql = %query.sql, "executing query");
        let mut cursor = stmt.execute_query()?;
        let fields = extract_fields(cursor.as_ref(), flavour)?;
        let mut rows = Vec::new();
        while cursor.advance()? {
            match mapper.map_row(cursor.as_ref(), &fields) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(sql = %query.sql, error = %e, "failed to map query result");
                    return Err(e);
                }
            }
        }
        Ok(rows)
    }

    /// Run a query expected to match at most one row.
    ///
    /// More than one row is a result-cardinality error stating the actual
    /// count.
    pub fn query_single<T>(
        &self,
        conn: &dyn DbConnection,
        sql: &str,
        args: &Args,
    ) -> Result<Option<T>>
    where
        T: FromRow + 'static,
    {
        let mapper = self.registry.get::<T>();
        self.query_single_with(conn, sql, mapper.as_ref(), args)
    }

    /// Single-row variant of [`QueryRunner::query_with`].
    pub fn query_single_with<T>(
        &self,
        conn: &dyn DbConnection,
        sql: &str,
        mapper: &dyn RowMapper<T>,
        args: &Args,
    ) -> Result<Option<T>> {
        let mut rows = self.query_with(conn, sql, mapper, args)?;
        if rows.len() > 1 {
            return Err(RowkitError::SingleResultExpected(rows.len()));
        }
        Ok(rows.pop())
    }

    /// Execute a statement that returns no rows; yields the affected-row
    /// count.
    pub fn execute(&self, conn: &dyn DbConnection, sql: &str, args: &Args) -> Result<u64> {
        let query = parse_checked(sql)?;
        let mut stmt = conn.prepare(&query.sql)?;
        bind_args(stmt.as_mut(), &query, args, conn.flavour())?;
        debug!(sql = %query.sql, "executing statement");
        stmt.execute_update()
    }

    /// Execute a statement with the parameter set extracted from one domain
    /// object.
    pub fn execute_one<T>(
        &self,
        conn: &dyn DbConnection,
        sql: &str,
        object: &T,
        accessors: &[ArgAccessor<'_, T>],
    ) -> Result<u64> {
        let query = parse_checked(sql)?;
        let mut stmt = conn.prepare(&query.sql)?;
        bind_accessors(stmt.as_mut(), &query, object, accessors, conn.flavour())?;
        debug!(sql = %query.sql, "executing statement");
        stmt.execute_update()
    }

    /// Execute a statement once per object as a driver batch, returning one
    /// affected-row count per object in input order.
    pub fn execute_all<T>(
        &self,
        conn: &dyn DbConnection,
        sql: &str,
        objects: &[T],
        accessors: &[ArgAccessor<'_, T>],
    ) -> Result<Vec<u64>> {
        let query = parse_checked(sql)?;
        let flavour = conn.flavour();
        let mut stmt = conn.prepare(&query.sql)?;
        for object in objects {
            bind_accessors(stmt.as_mut(), &query, object, accessors, flavour)?;
            stmt.add_batch()?;
        }
        debug!(sql = %query.sql, batch = objects.len(), "executing batch");
        stmt.execute_batch()
    }
}

fn parse_checked(sql: &str) -> Result<Query> {
    if sql.trim().is_empty() {
        return Err(RowkitError::Parse(
            "SQL query cannot be empty or blank".to_string(),
        ));
    }
    Query::parse(sql)
}

/// Bind every named argument at every position its token occupies.
fn bind_args(
    stmt: &mut dyn DbStatement,
    query: &Query,
    args: &Args,
    flavour: DbFlavour,
) -> Result<()> {
    for (name, value) in args {
        let positions = query.tokens.get(name).ok_or_else(|| {
            RowkitError::Parse(format!("token with name '{name}' not found in template"))
        })?;
        for &position in positions {
            bind_value(stmt, position, value, flavour)?;
        }
    }
    Ok(())
}

fn bind_accessors<T>(
    stmt: &mut dyn DbStatement,
    query: &Query,
    object: &T,
    accessors: &[ArgAccessor<'_, T>],
    flavour: DbFlavour,
) -> Result<()> {
    for (name, accessor) in accessors {
        let positions = query.tokens.get(*name).ok_or_else(|| {
            RowkitError::Parse(format!("token with name '{name}' not found in template"))
        })?;
        let value = accessor(object);
        for &position in positions {
            bind_value(stmt, position, &value, flavour)?;
        }
    }
    Ok(())
}
