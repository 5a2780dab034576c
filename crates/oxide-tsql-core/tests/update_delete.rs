//! Tests for UPDATE and DELETE compilation.

use oxide_tsql_core::ast::{Expr, FuncKind, DeleteQuery, UpdateQuery};
use oxide_tsql_core::{Capabilities, CompileError, DeleteCompiler, UpdateCompiler};

fn caps() -> Capabilities {
    Capabilities::default()
}

#[test]
fn update_with_nested_expression_value() {
    let query = UpdateQuery::new("articles")
        .set(
            "title",
            Expr::func(FuncKind::Trim, vec![Expr::column("title")]),
        )
        .filter(Expr::column("id").eq(Expr::value(9_i64)));
    let (sql, params) = UpdateCompiler::new(&query, &caps()).compile().unwrap();
    assert_eq!(
        sql,
        "UPDATE [articles] SET [title] = LTRIM(RTRIM([title])) WHERE [id] = ?"
    );
    assert_eq!(params.len(), 1);
}

#[test]
fn update_rejects_aggregates_naming_the_column() {
    let query = UpdateQuery::new("stats").set(
        "total",
        Expr::func(FuncKind::Sum, vec![Expr::column("amount")]),
    );
    let err = UpdateCompiler::new(&query, &caps()).compile().unwrap_err();
    assert!(matches!(err, CompileError::InvalidQueryShape(_)));
    assert!(err.to_string().contains("total"));
}

#[test]
fn update_rejects_window_expressions() {
    let query = UpdateQuery::new("stats").set(
        "rank",
        Expr::Window {
            expr: Box::new(Expr::func(FuncKind::Count, vec![Expr::column("id")])),
            partition_by: vec![],
            order_by: vec![],
            frame: None,
        },
    );
    assert!(UpdateCompiler::new(&query, &caps()).compile().is_err());
}

#[test]
fn update_omits_vacuous_where() {
    let query = UpdateQuery::new("users")
        .set("active", Expr::value(true))
        .filter(Expr::boolean(true));
    let (sql, params) = UpdateCompiler::new(&query, &caps()).compile().unwrap();
    assert_eq!(sql, "UPDATE [users] SET [active] = ?");
    assert_eq!(params.len(), 1);
}

#[test]
fn update_without_values_is_empty() {
    let query = UpdateQuery::new("users");
    let (sql, params) = UpdateCompiler::new(&query, &caps()).compile().unwrap();
    assert!(sql.is_empty());
    assert!(params.is_empty());
}

#[test]
fn delete_reenables_row_counts() {
    let query = DeleteQuery::new("sessions")
        .filter(Expr::column("user_id").eq(Expr::value(7_i64)));
    let (sql, params) = DeleteCompiler::new(&query, &caps()).compile().unwrap();
    assert_eq!(
        sql,
        "SET NOCOUNT OFF; DELETE FROM [sessions] WHERE [user_id] = ?"
    );
    assert_eq!(params.len(), 1);
}

#[test]
fn delete_omits_vacuous_where() {
    let query = DeleteQuery::new("sessions").filter(Expr::boolean(true));
    let (sql, _) = DeleteCompiler::new(&query, &caps()).compile().unwrap();
    assert_eq!(sql, "SET NOCOUNT OFF; DELETE FROM [sessions]");
}

#[test]
fn delete_never_true_where_renders_contradiction() {
    let query = DeleteQuery::new("sessions").filter(Expr::boolean(false));
    let (sql, _) = DeleteCompiler::new(&query, &caps()).compile().unwrap();
    assert_eq!(sql, "SET NOCOUNT OFF; DELETE FROM [sessions] WHERE 0 = 1");
}
