//! Expression compilation.
//!
//! Walks a query tree expression into a [`Fragment`], consulting the
//! rewrite registry for function nodes. Compilation reads the tree
//! immutably; repeated compilation of the same tree is safe.

use crate::ast::expression::{Expr, FuncKind, UnaryOp};
use crate::ast::ident;
use crate::ast::statement::OrderBy;
use crate::capability::Capabilities;
use crate::error::{CompileError, Result};
use crate::fragment::Fragment;
use crate::rewrite;

use super::select::SelectCompiler;

/// The largest SUBSTRING length T-SQL accepts; stands in for "the rest of
/// the string" since the dialect has no two-argument form.
const SUBSTR_REST_OF_STRING: i64 = 2_147_483_647;

/// Compiles expressions against a fixed capability record.
pub struct ExprCompiler<'a> {
    caps: &'a Capabilities,
}

impl<'a> ExprCompiler<'a> {
    /// Creates a new expression compiler.
    #[must_use]
    pub const fn new(caps: &'a Capabilities) -> Self {
        Self { caps }
    }

    /// Compiles `expr` into a fragment.
    pub fn compile(&self, expr: &Expr) -> Result<Fragment> {
        match expr {
            Expr::Literal(lit) => Ok(Fragment::raw(lit.to_sql())),
            Expr::Value(v) => Ok(Fragment::param(v.clone())),
            Expr::Column { table, name } => {
                Ok(Fragment::raw(ident::quote_column(table.as_deref(), name)))
            }
            Expr::Wildcard { table } => Ok(match table {
                Some(t) => Fragment::raw(format!("{}.*", ident::quote(t))),
                None => Fragment::raw("*"),
            }),
            Expr::Binary { left, op, right } => {
                let mut out = self.compile(left)?;
                out.push_sql(&format!(" {} ", op.as_str()));
                out.append(self.compile(right)?);
                Ok(out)
            }
            Expr::Unary { op, operand } => {
                let inner = self.compile(operand)?;
                let mut out = match op {
                    UnaryOp::Not => Fragment::raw("NOT "),
                    UnaryOp::Neg => Fragment::raw("-"),
                    UnaryOp::BitNot => Fragment::raw("~"),
                };
                out.append(inner);
                Ok(out)
            }
            Expr::Func {
                kind,
                args,
                distinct,
            } => self.compile_call(*kind, args, *distinct),
            Expr::Window {
                expr,
                partition_by,
                order_by,
                frame,
            } => self.compile_window(expr, partition_by, order_by, frame.as_ref()),
            Expr::Subquery(query) => {
                let (sql, params) = SelectCompiler::new(query, self.caps)
                    .as_subquery()
                    .compile()?;
                Ok(Fragment::with_params(format!("({sql})"), params))
            }
            Expr::JsonPath { target, keys } => self.compile_json_path(target, keys),
            Expr::IsNull { expr, negated } => {
                let mut out = self.compile(expr)?;
                out.push_sql(if *negated { " IS NOT NULL" } else { " IS NULL" });
                Ok(out)
            }
            Expr::In {
                expr,
                list,
                negated,
            } => {
                let mut out = self.compile(expr)?;
                out.push_sql(if *negated { " NOT IN (" } else { " IN (" });
                let items = list
                    .iter()
                    .map(|item| self.compile(item))
                    .collect::<Result<Vec<_>>>()?;
                out.append(Fragment::join(items, ", "));
                out.push_sql(")");
                Ok(out)
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let mut out = self.compile(expr)?;
                out.push_sql(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                out.append(self.compile(low)?);
                out.push_sql(" AND ");
                out.append(self.compile(high)?);
                Ok(out)
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut out = Fragment::raw("CASE");
                if let Some(op) = operand {
                    out.push_sql(" ");
                    out.append(self.compile(op)?);
                }
                for (when, then) in when_clauses {
                    out.push_sql(" WHEN ");
                    out.append(self.compile(when)?);
                    out.push_sql(" THEN ");
                    out.append(self.compile(then)?);
                }
                if let Some(els) = else_clause {
                    out.push_sql(" ELSE ");
                    out.append(self.compile(els)?);
                }
                out.push_sql(" END");
                Ok(out)
            }
            Expr::Paren(inner) => {
                let mut out = Fragment::raw("(");
                out.append(self.compile(inner)?);
                out.push_sql(")");
                Ok(out)
            }
            Expr::Ref { name, .. } => Ok(Fragment::raw(ident::quote(name))),
            Expr::Raw { sql, params } => Ok(Fragment::with_params(sql.clone(), params.clone())),
        }
    }

    /// Compiles an ORDER BY entry as `<expr> ASC|DESC`.
    pub fn compile_order(&self, entry: &OrderBy) -> Result<Fragment> {
        let mut out = self.compile(&entry.expr)?;
        out.push_sql(" ");
        out.push_sql(entry.direction.as_str());
        Ok(out)
    }

    fn compile_call(&self, kind: FuncKind, args: &[Expr], distinct: bool) -> Result<Fragment> {
        // SUBSTRING has no "rest of the string" form; supply the maximum
        // length when the caller omitted one.
        let rest: Vec<Expr>;
        let args = if kind == FuncKind::Substr && args.len() == 2 {
            rest = args
                .iter()
                .cloned()
                .chain(std::iter::once(Expr::integer(SUBSTR_REST_OF_STRING)))
                .collect();
            &rest[..]
        } else {
            args
        };

        let compiled = args
            .iter()
            .map(|arg| self.compile(arg))
            .collect::<Result<Vec<_>>>()?;

        Ok(
            match rewrite::rewrite_call(kind, &compiled, distinct, self.caps) {
                Some(frag) => frag,
                None => rewrite::render_call(kind.generic_name(), &compiled, distinct),
            },
        )
    }

    fn compile_window(
        &self,
        expr: &Expr,
        partition_by: &[Expr],
        order_by: &[OrderBy],
        frame: Option<&crate::ast::expression::WindowFrame>,
    ) -> Result<Fragment> {
        if !self.caps.supports_over_clause {
            return Err(CompileError::unsupported("window expressions"));
        }
        if frame.is_some() && !self.caps.supports_window_frames {
            return Err(CompileError::unsupported("window frames"));
        }

        let mut out = self.compile(expr)?;
        out.push_sql(" OVER (");

        let mut first = true;
        if !partition_by.is_empty() {
            out.push_sql("PARTITION BY ");
            let parts = partition_by
                .iter()
                .map(|p| self.compile(p))
                .collect::<Result<Vec<_>>>()?;
            out.append(Fragment::join(parts, ", "));
            first = false;
        }

        if !first {
            out.push_sql(" ");
        }
        if order_by.is_empty() {
            // An OVER clause must carry an ORDER BY on this engine; this
            // no-op ordering keeps the clause valid without imposing one.
            out.push_sql("ORDER BY (SELECT NULL)");
        } else {
            out.push_sql("ORDER BY ");
            let parts = order_by
                .iter()
                .map(|o| self.compile_order(o))
                .collect::<Result<Vec<_>>>()?;
            out.append(Fragment::join(parts, ", "));
        }

        if let Some(frame) = frame {
            out.push_sql(" ");
            out.push_sql(&frame.to_sql());
        }

        out.push_sql(")");
        Ok(out)
    }

    fn compile_json_path(&self, target: &Expr, keys: &[String]) -> Result<Fragment> {
        let compiled = self.compile(target)?;
        let path = ident::json_path(keys).replace('\'', "''");

        // JSON_QUERY handles structured values, JSON_VALUE scalars; COALESCE
        // of the two answers both. Target and path appear twice, and the
        // bind values are duplicated with the text.
        let mut out = Fragment::raw("COALESCE(JSON_QUERY(");
        out.append(compiled.clone());
        out.push_sql(&format!(", '{path}'), JSON_VALUE("));
        out.append(compiled);
        out.push_sql(&format!(", '{path}'))"));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::{BinaryOp, FrameBound, FrameUnits, WindowFrame};
    use crate::ast::statement::OrderDirection;
    use crate::ast::value::SqlValue;

    fn compile(expr: &Expr) -> Fragment {
        ExprCompiler::new(&Capabilities::default())
            .compile(expr)
            .unwrap()
    }

    #[test]
    fn test_column_and_value() {
        let expr = Expr::qualified_column("u", "name").eq(Expr::value("Alice"));
        let frag = compile(&expr);
        assert_eq!(frag.sql(), "[u].[name] = ?");
        assert_eq!(frag.params(), &[SqlValue::Text(String::from("Alice"))]);
    }

    #[test]
    fn test_binary_concat_uses_plus() {
        let expr = Expr::column("a").binary(BinaryOp::Concat, Expr::column("b"));
        assert_eq!(compile(&expr).sql(), "[a] + [b]");
    }

    #[test]
    fn test_substr_default_length() {
        let expr = Expr::func(
            FuncKind::Substr,
            vec![Expr::column("body"), Expr::integer(5)],
        );
        assert_eq!(compile(&expr).sql(), "SUBSTRING([body], 5, 2147483647)");
    }

    #[test]
    fn test_substr_explicit_length_untouched() {
        let expr = Expr::func(
            FuncKind::Substr,
            vec![Expr::column("body"), Expr::integer(5), Expr::integer(3)],
        );
        assert_eq!(compile(&expr).sql(), "SUBSTRING([body], 5, 3)");
    }

    #[test]
    fn test_window_synthesizes_ordering() {
        let expr = Expr::Window {
            expr: Box::new(Expr::func(FuncKind::Sum, vec![Expr::column("amount")])),
            partition_by: vec![Expr::column("region")],
            order_by: vec![],
            frame: None,
        };
        assert_eq!(
            compile(&expr).sql(),
            "SUM([amount]) OVER (PARTITION BY [region] ORDER BY (SELECT NULL))"
        );
    }

    #[test]
    fn test_window_with_ordering_and_frame() {
        let expr = Expr::Window {
            expr: Box::new(Expr::func(FuncKind::Sum, vec![Expr::column("amount")])),
            partition_by: vec![],
            order_by: vec![OrderBy {
                expr: Expr::column("day"),
                direction: OrderDirection::Desc,
            }],
            frame: Some(WindowFrame {
                units: FrameUnits::Rows,
                start: FrameBound::UnboundedPreceding,
                end: FrameBound::CurrentRow,
            }),
        };
        assert_eq!(
            compile(&expr).sql(),
            "SUM([amount]) OVER (ORDER BY [day] DESC ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)"
        );
    }

    #[test]
    fn test_window_unsupported() {
        let caps = Capabilities::for_version(2000);
        let expr = Expr::Window {
            expr: Box::new(Expr::func(FuncKind::Count, vec![Expr::column("id")])),
            partition_by: vec![],
            order_by: vec![],
            frame: None,
        };
        let err = ExprCompiler::new(&caps).compile(&expr).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedFeature { .. }));
    }

    #[test]
    fn test_json_path_duplicates_target() {
        let expr = Expr::JsonPath {
            target: Box::new(Expr::Value(SqlValue::Text(String::from("{}")))),
            keys: vec![String::from("a"), String::from("b")],
        };
        let frag = compile(&expr);
        assert_eq!(
            frag.sql(),
            "COALESCE(JSON_QUERY(?, '$.\"a\".\"b\"'), JSON_VALUE(?, '$.\"a\".\"b\"'))"
        );
        assert_eq!(frag.params().len(), 2);
    }

    #[test]
    fn test_case_expression() {
        let expr = Expr::Case {
            operand: None,
            when_clauses: vec![(
                Expr::column("qty").gt(Expr::integer(10)),
                Expr::string("bulk"),
            )],
            else_clause: Some(Box::new(Expr::string("unit"))),
        };
        assert_eq!(
            compile(&expr).sql(),
            "CASE WHEN [qty] > 10 THEN 'bulk' ELSE 'unit' END"
        );
    }
}
