//! UPDATE statement compilation.

use crate::ast::ident;
use crate::ast::statement::UpdateQuery;
use crate::ast::value::SqlValue;
use crate::capability::Capabilities;
use crate::error::{CompileError, Result};
use crate::fragment::Fragment;

use super::expr::ExprCompiler;

/// Compiles an [`UpdateQuery`] into SQL text and bind values.
pub struct UpdateCompiler<'q> {
    query: &'q UpdateQuery,
    caps: &'q Capabilities,
}

impl<'q> UpdateCompiler<'q> {
    /// Creates a compiler for `query` against `caps`.
    #[must_use]
    pub const fn new(query: &'q UpdateQuery, caps: &'q Capabilities) -> Self {
        Self { query, caps }
    }

    /// Compiles the statement. An update with no assignments compiles to an
    /// empty statement.
    pub fn compile(&self) -> Result<(String, Vec<SqlValue>)> {
        if self.query.assignments.is_empty() {
            return Ok((String::new(), vec![]));
        }

        let exprs = ExprCompiler::new(self.caps);
        let mut stmt = Fragment::raw(format!(
            "UPDATE {} SET ",
            ident::quote_table(&self.query.table)
        ));

        let mut assignments = Vec::with_capacity(self.query.assignments.len());
        for assignment in &self.query.assignments {
            if assignment.value.contains_aggregate() {
                return Err(CompileError::InvalidQueryShape(format!(
                    "aggregate functions are not allowed in UPDATE assignments ({})",
                    assignment.column
                )));
            }
            if assignment.value.contains_window() {
                return Err(CompileError::InvalidQueryShape(format!(
                    "window expressions are not allowed in UPDATE assignments ({})",
                    assignment.column
                )));
            }
            let mut frag = Fragment::raw(format!("{} = ", ident::quote(&assignment.column)));
            frag.append(exprs.compile(&assignment.value)?);
            assignments.push(frag);
        }
        stmt.append(Fragment::join(assignments, ", "));

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
