//! Tests for INSERT compilation: identity-column control, returning
//! strategies, and default-values bulk emulation.

use oxide_tsql_core::ast::{Expr, InsertQuery};
use oxide_tsql_core::{Capabilities, InsertCompiler, SqlValue};

fn compile(query: &InsertQuery, caps: &Capabilities) -> Vec<(String, Vec<SqlValue>)> {
    InsertCompiler::new(query, caps)
        .compile()
        .unwrap_or_else(|e| panic!("Failed to compile: {query:?}\nError: {e:?}"))
}

#[test]
fn explicit_pk_produces_override_sequence() {
    let query = InsertQuery::new(
        "users",
        vec![String::from("id"), String::from("name")],
        vec![vec![Expr::value(42_i64), Expr::value("Alice")]],
    )
    .pk("id");
    let stmts = compile(&query, &Capabilities::default());
    assert_eq!(stmts.len(), 1);
    assert_eq!(
        stmts[0].0,
        "SET IDENTITY_INSERT [users] ON; \
         INSERT INTO [users] ([id], [name]) VALUES (?, ?); \
         SET IDENTITY_INSERT [users] OFF"
    );
    assert_eq!(stmts[0].1.len(), 2);
}

#[test]
fn override_never_appears_without_explicit_pk() {
    let query = InsertQuery::new(
        "users",
        vec![String::from("name")],
        vec![vec![Expr::value("Alice")]],
    )
    .pk("id");
    let stmts = compile(&query, &Capabilities::default());
    assert!(!stmts[0].0.contains("IDENTITY_INSERT"));
}

#[test]
fn override_wraps_every_statement_of_a_split_batch() {
    let mut caps = Capabilities::default();
    caps.has_bulk_insert = false;
    let query = InsertQuery::new(
        "users",
        vec![String::from("id")],
        vec![vec![Expr::value(1_i64)], vec![Expr::value(2_i64)]],
    )
    .pk("id");
    let stmts = compile(&query, &caps);
    assert_eq!(stmts.len(), 2);
    for (sql, _) in &stmts {
        assert!(sql.starts_with("SET IDENTITY_INSERT [users] ON; "));
        assert!(sql.ends_with("SET IDENTITY_INSERT [users] OFF"));
    }
}

#[test]
fn bulk_returning_is_one_statement_with_output() {
    let query = InsertQuery::new(
        "users",
        vec![String::from("name")],
        vec![
            vec![Expr::value("a")],
            vec![Expr::value("b")],
            vec![Expr::value("c")],
        ],
    )
    .returning(vec![String::from("id")]);
    let stmts = compile(&query, &Capabilities::default());
    assert_eq!(stmts.len(), 1);
    assert_eq!(
        stmts[0].0,
        "INSERT INTO [users] ([name]) OUTPUT INSERTED.[id] VALUES (?), (?), (?)"
    );
    assert_eq!(stmts[0].1.len(), 3);
}

#[test]
fn single_row_returning_without_bulk_support_fetches_scalar() {
    let mut caps = Capabilities::default();
    caps.can_return_rows_from_bulk_insert = false;
    let query = InsertQuery::new(
        "users",
        vec![String::from("name")],
        vec![vec![Expr::value("a")]],
    )
    .returning(vec![String::from("id")]);
    let stmts = compile(&query, &caps);
    assert_eq!(stmts.len(), 1);
    let sql = &stmts[0].0;
    assert!(sql.starts_with("SET NOCOUNT ON "));
    assert!(sql.ends_with("; SELECT CAST(SCOPE_IDENTITY() AS bigint)"));
}

#[test]
fn default_rows_emulation_counts() {
    // Each requested row count must survive the MERGE emulation's TOP cap.
    for k in [1_usize, 2, 4095] {
        let query =
            InsertQuery::defaults("jobs", k).returning(vec![String::from("id")]);
        let stmts = compile(&query, &Capabilities::default());
        assert_eq!(stmts.len(), 1);
        let sql = &stmts[0].0;
        assert!(sql.contains(&format!("SELECT TOP {k} *")), "missing cap in: {sql}");
        // The seed cross-join must produce at least k fake rows.
        assert!(8_usize.pow(4) >= k);
    }
}

#[test]
fn default_rows_without_returning_issue_one_statement_each() {
    let query = InsertQuery::defaults("jobs", 3);
    let stmts = compile(&query, &Capabilities::default());
    assert_eq!(stmts.len(), 3);
    for (sql, params) in &stmts {
        assert_eq!(sql, "INSERT INTO [jobs] DEFAULT VALUES");
        assert!(params.is_empty());
    }
}

#[test]
fn schema_qualified_insert() {
    let mut query = InsertQuery::new(
        "events",
        vec![String::from("kind")],
        vec![vec![Expr::value("login")]],
    );
    query.table = oxide_tsql_core::ast::TableName::with_schema("audit", "events");
    let stmts = compile(&query, &Capabilities::default());
    assert_eq!(
        stmts[0].0,
        "INSERT INTO [audit].[events] ([kind]) VALUES (?)"
    );
}

#[test]
fn parameters_match_placeholders_in_every_statement() {
    let query = InsertQuery::new(
        "users",
        vec![String::from("name"), String::from("age")],
        vec![
            vec![Expr::value("a"), Expr::value(1_i64)],
            vec![Expr::value("b"), Expr::value(2_i64)],
        ],
    );
    let stmts = compile(&query, &Capabilities::default());
    for (sql, params) in &stmts {
        assert_eq!(sql.matches('?').count(), params.len());
    }
}
