//! GROUP BY legalization.
//!
//! The engine rejects two classes of grouping expressions: expressions that
//! are pure constants ("each GROUP BY expression must contain at least one
//! column that is not an outer reference") and expressions that are, or
//! contain, a subquery ("cannot use an aggregate or a subquery in an
//! expression used for the GROUP BY list"). Both are dropped here; when
//! this empties a GROUP BY the ordering still depends on, the select
//! compiler forces a degenerate deterministic ordering instead of failing.

use crate::ast::expression::Expr;

/// Filters `exprs` down to the grouping expressions the engine accepts.
pub(crate) fn legalize(exprs: &[Expr]) -> Vec<&Expr> {
    exprs
        .iter()
        .filter(|e| !e.is_constant() && !e.contains_subquery())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::FuncKind;
    use crate::ast::statement::SelectQuery;

    #[test]
    fn test_drops_constants_and_subqueries() {
        let subquery = Expr::Subquery(Box::new(SelectQuery::from_table("t")));
        let input = vec![
            Expr::integer(1),
            Expr::column("a"),
            subquery,
            Expr::func(FuncKind::Upper, vec![Expr::string("x")]),
        ];
        let legal = legalize(&input);
        assert_eq!(legal, vec![&Expr::column("a")]);
    }

    #[test]
    fn test_drops_deeply_nested_subquery() {
        let subquery = Expr::Subquery(Box::new(SelectQuery::from_table("t")));
        let nested = Expr::func(
            FuncKind::Upper,
            vec![Expr::func(FuncKind::Lower, vec![subquery])],
        );
        let input = vec![nested, Expr::column("b")];
        let legal = legalize(&input);
        assert_eq!(legal, vec![&Expr::column("b")]);
    }

    #[test]
    fn test_keeps_column_functions() {
        let input = vec![Expr::func(FuncKind::Upper, vec![Expr::column("name")])];
        assert_eq!(legalize(&input).len(), 1);
    }
}
