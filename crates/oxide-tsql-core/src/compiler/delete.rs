//! DELETE statement compilation.

use crate::ast::ident;
use crate::ast::statement::DeleteQuery;
use crate::ast::value::SqlValue;
use crate::capability::Capabilities;
use crate::error::Result;
use crate::fragment::Fragment;

use super::expr::ExprCompiler;

/// Compiles a [`DeleteQuery`] into SQL text and bind values.
pub struct DeleteCompiler<'q> {
    query: &'q DeleteQuery,
    caps: &'q Capabilities,
}

impl<'q> DeleteCompiler<'q> {
    /// Creates a compiler for `query` against `caps`.
    #[must_use]
    pub const fn new(query: &'q DeleteQuery, caps: &'q Capabilities) -> Self {
        Self { query, caps }
    }

    /// Compiles the statement.
    ///
    /// Row-count reporting is explicitly re-enabled so callers observe the
    /// affected-row count regardless of connection defaults.
    pub fn compile(&self) -> Result<(String, Vec<SqlValue>)> {
        let exprs = ExprCompiler::new(self.caps);
        let mut stmt = Fragment::raw(format!(
            "SET NOCOUNT OFF; DELETE FROM {}",
            ident::quote_table(&self.query.table)
        ));

        match &self.query.where_clause {
            Some(predicate) if predicate.is_trivially_true() => {}
            Some(predicate) if predicate.is_trivially_false() => {
                stmt.push_sql(" WHERE 0 = 1");
            }
            Some(predicate) => {
                stmt.push_sql(" WHERE ");
                stmt.append(exprs.compile(predicate)?);
            }
            None => {}
        }

        Ok(stmt.into_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::Expr;

    fn caps() -> Capabilities {
        Capabilities::default()
    }

    #[test]
    fn test_delete_all() {
        let query = DeleteQuery::new("sessions");
        let (sql, params) = DeleteCompiler::new(&query, &caps()).compile().unwrap();
        assert_eq!(sql, "SET NOCOUNT OFF; DELETE FROM [sessions]");
        assert!(params.is_empty());
    }

    #[test]
    fn test_delete_with_where() {
        let query = DeleteQuery::new("sessions")
            .filter(Expr::column("expires_at").lt(Expr::value(0_i64)));
        let (sql, params) = DeleteCompiler::new(&query, &caps()).compile().unwrap();
        assert_eq!(
            sql,
            "SET NOCOUNT OFF; DELETE FROM [sessions] WHERE [expires_at] < ?"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_always_true_where_omitted() {
        let query = DeleteQuery::new("sessions").filter(Expr::boolean(true));
        let (sql, _) = DeleteCompiler::new(&query, &caps()).compile().unwrap();
        assert_eq!(sql, "SET NOCOUNT OFF; DELETE FROM [sessions]");
    }
}
