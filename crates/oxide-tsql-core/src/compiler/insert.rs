//! INSERT statement compilation.
//!
//! A logical insert can require more than one physical statement (identity
//! override framing, follow-up identity fetch), so compilation yields a
//! sequence of `(sql, params)` pairs to execute in order.

use crate::ast::expression::Expr;
use crate::ast::ident;
use crate::ast::statement::{InsertQuery, InsertSource};
use crate::ast::value::SqlValue;
use crate::capability::Capabilities;
use crate::error::{CompileError, Result};
use crate::fragment::Fragment;

use super::expr::ExprCompiler;

/// Number of seed rows in the default-values MERGE emulation.
const SEED_ROWS: usize = 8;
/// Cross-join power of the seed CTE; 8^4 = 4096 rows, above the engine's
/// 1000-row bulk batch cap.
const CROSS_JOIN_POWER: usize = 4;

/// Compiles an [`InsertQuery`] into one or more SQL statements.
pub struct InsertCompiler<'q> {
    query: &'q InsertQuery,
    caps: &'q Capabilities,
}

impl<'q> InsertCompiler<'q> {
    /// Creates a compiler for `query` against `caps`.
    #[must_use]
    pub const fn new(query: &'q InsertQuery, caps: &'q Capabilities) -> Self {
        Self { query, caps }
    }

    /// Compiles the insert into its physical statement sequence.
    pub fn compile(&self) -> Result<Vec<(String, Vec<SqlValue>)>> {
        let statements = match &self.query.source {
            InsertSource::Values(rows) => self.compile_values(rows)?,
            InsertSource::DefaultValues { rows } => self.compile_defaults(*rows)?,
        };
        Ok(self.fix_auto(statements))
    }

    fn table(&self) -> String {
        let table = &self.query.table;
        match (&table.schema, &self.caps.default_schema) {
            (Some(schema), default) if default.as_deref() != Some(schema.as_str()) => {
                format!("{}.{}", ident::quote(schema), ident::quote(&table.name))
            }
            _ => ident::quote(&table.name),
        }
    }

    fn returning_requested(&self) -> bool {
        !self.query.returning.is_empty()
    }

    fn output_clause(&self) -> String {
        let cols = self
            .query
            .returning
            .iter()
            .map(|c| format!("INSERTED.{}", ident::quote(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OUTPUT {cols}")
    }

    fn compile_values(&self, rows: &[Vec<Expr>]) -> Result<Vec<(String, Vec<SqlValue>)>> {
        if rows.is_empty() {
            return Err(CompileError::InvalidQueryShape(String::from(
                "insert has no value rows",
            )));
        }
        if self.query.columns.is_empty() {
            return Err(CompileError::InvalidQueryShape(String::from(
                "insert rows given without column list",
            )));
        }
        for row in rows {
            if row.len() != self.query.columns.len() {
                return Err(CompileError::InvalidQueryShape(format!(
                    "insert row has {} values for {} columns",
                    row.len(),
                    self.query.columns.len()
                )));
            }
        }

        let exprs = ExprCompiler::new(self.caps);
        let columns = self
            .query
            .columns
            .iter()
            .map(|c| ident::quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let head = format!("INSERT INTO {} ({columns})", self.table());

        let mut row_frags = Vec::with_capacity(rows.len());
        for row in rows {
            let values = row
                .iter()
                .map(|v| exprs.compile(v))
                .collect::<Result<Vec<_>>>()?;
            let mut frag = Fragment::raw("(");
            frag.append(Fragment::join(values, ", "));
            frag.push_sql(")");
            row_frags.push(frag);
        }

        if self.returning_requested() && self.caps.can_return_columns_from_insert {
            if self.caps.can_return_rows_from_bulk_insert {
                // OUTPUT yields one returned row per inserted row, so the
                // whole batch stays a single statement.
                let mut stmt = Fragment::raw(format!("{head} {} VALUES ", self.output_clause()));
                stmt.append(Fragment::join(row_frags, ", "));
                return Ok(vec![stmt.into_parts()]);
            }
            // Single-row fallback: suppress row-count chatter, insert, then
            // fetch the generated identity as a scalar.
            let row = row_frags.into_iter().next().unwrap_or_default();
            let mut stmt = Fragment::raw(format!("SET NOCOUNT ON {head} VALUES "));
            stmt.append(row);
            stmt.push_sql("; SELECT CAST(SCOPE_IDENTITY() AS bigint)");
            return Ok(vec![stmt.into_parts()]);
        }

        if self.caps.has_bulk_insert {
            let mut stmt = Fragment::raw(format!("{head} VALUES "));
            stmt.append(Fragment::join(row_frags, ", "));
            Ok(vec![stmt.into_parts()])
        } else {
            Ok(row_frags
                .into_iter()
                .map(|row| {
                    let mut stmt = Fragment::raw(format!("{head} VALUES "));
                    stmt.append(row);
                    stmt.into_parts()
                })
                .collect())
        }
    }

    fn compile_defaults(&self, rows: usize) -> Result<Vec<(String, Vec<SqlValue>)>> {
        if rows == 0 {
            return Err(CompileError::InvalidQueryShape(String::from(
                "insert has no value rows",
            )));
        }
        let table = self.table();

        if self.returning_requested() && self.caps.can_return_columns_from_insert {
            if self.caps.can_return_rows_from_bulk_insert {
                return Ok(vec![(self.bulk_default_values_sql(&table, rows), vec![])]);
            }
            let sql = format!(
                "SET NOCOUNT ON INSERT INTO {table} DEFAULT VALUES; \
                 SELECT CAST(SCOPE_IDENTITY() AS bigint)"
            );
            return Ok(vec![(sql, vec![])]);
        }

        // No single statement bulk-inserts several DEFAULT VALUES rows; emit
        // one statement per row.
        let sql = format!("INSERT INTO {table} DEFAULT VALUES");
        Ok((0..rows).map(|_| (sql.clone(), vec![])).collect())
    }

    /// There is no plain statement that inserts k all-default rows while
    /// returning their identities. Seed a small CTE, cross-join it past the
    /// batch cap, cap the fake row set at k, and MERGE-insert default values
    /// once per fake row with an OUTPUT clause.
    fn bulk_default_values_sql(&self, table: &str, rows: usize) -> String {
        let seeds = (0..SEED_ROWS)
            .map(|_| "SELECT 1 AS x")
            .collect::<Vec<_>>()
            .join(" UNION ALL ");
        let cross = (0..CROSS_JOIN_POWER)
            .map(|i| format!("SEED_ROWS AS _{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "WITH SEED_ROWS AS ({seeds}) \
             MERGE INTO {table} \
             USING (SELECT TOP {rows} * FROM (SELECT 1 AS x FROM {cross}) FAKE_ROWS) FAKE_DATA \
             ON 1 = 0 \
             WHEN NOT MATCHED THEN INSERT DEFAULT VALUES \
             {};",
            self.output_clause()
        )
    }

    /// Explicit values for an auto-generated key are rejected unless
    /// identity-override mode is active; frame every statement with the mode
    /// toggle so it cannot leak past the insert.
    fn fix_auto(&self, statements: Vec<(String, Vec<SqlValue>)>) -> Vec<(String, Vec<SqlValue>)> {
        let Some(pk) = &self.query.pk_column else {
            return statements;
        };
        if !self.query.columns.iter().any(|c| c == pk) {
            return statements;
        }
        let table = self.table();
        statements
            .into_iter()
            .map(|(sql, params)| {
                (
                    format!(
                        "SET IDENTITY_INSERT {table} ON; {sql}; SET IDENTITY_INSERT {table} OFF"
                    ),
                    params,
                )
            })
            .collect()
    }
}
