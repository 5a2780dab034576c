//! Execution of compiled statements.
//!
//! Statements arrive from the compilers as `(sql, params)` pairs carrying
//! `?` placeholders; they are renumbered to the wire's `@Pn` convention
//! here, at the last moment before binding.

use futures::TryStreamExt;
use oxide_tsql_core::fragment::number_placeholders;
use oxide_tsql_core::SqlValue;
use tracing::debug;

use crate::connection::MssqlClient;
use crate::error::Result;

fn build_query<'a>(sql: &str, params: &'a [SqlValue]) -> tiberius::Query<'a> {
    let mut query = tiberius::Query::new(number_placeholders(sql));
    for value in params {
        match value {
            SqlValue::Null => query.bind(Option::<i64>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Blob(b) => query.bind(b.as_slice()),
        }
    }
    query
}

/// Executes a row-less statement and returns the affected-row count.
pub async fn execute(
    client: &mut MssqlClient,
    sql: &str,
    params: &[SqlValue],
) -> Result<u64> {
    debug!(params = params.len(), "executing statement");
    let result = build_query(sql, params).execute(client).await?;
    Ok(result.total())
}

/// Runs a query and collects the rows of its first result set.
pub async fn query_rows(
    client: &mut MssqlClient,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<tiberius::Row>> {
    debug!(params = params.len(), "running query");
    let mut stream = build_query(sql, params).query(client).await?;
    let mut rows = Vec::new();
    while let Some(item) = stream.try_next().await? {
        if let tiberius::QueryItem::Row(row) = item {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Runs the physical statement sequence of a compiled insert in order,
/// collecting every generated identity the statements hand back (OUTPUT
/// rows or the trailing SCOPE_IDENTITY fetch).
pub async fn run_insert(
    client: &mut MssqlClient,
    statements: &[(String, Vec<SqlValue>)],
) -> Result<Vec<i64>> {
    let mut identities = Vec::new();
    for (sql, params) in statements {
        let rows = query_rows(client, sql, params).await?;
        for row in &rows {
            if let Some(id) = row.get::<i64, _>(0) {
                identities.push(id);
            }
        }
    }
    debug!(
        statements = statements.len(),
        returned = identities.len(),
        "insert sequence complete"
    );
    Ok(identities)
}
