//! End-to-end tests for dialect function rewrites, driven through full
//! SELECT compilation.

mod common;
use common::*;

use oxide_tsql_core::ast::{Expr, FuncKind, SelectQuery};

fn select_expr(expr: Expr) -> SelectQuery {
    SelectQuery::from_table("t").column(expr)
}

#[test]
fn average_wraps_operand_in_float_cast() {
    let query = select_expr(Expr::func(FuncKind::Avg, vec![Expr::column("age")]));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT AVG(CONVERT(float, [age])) FROM [t]");
}

#[test]
fn chr_uses_national_character_constructor() {
    let query = select_expr(Expr::func(FuncKind::Chr, vec![Expr::integer(65)]));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT NCHAR(65) FROM [t]");
}

#[test]
fn concat_native_above_threshold() {
    let query = select_expr(Expr::func(
        FuncKind::Concat,
        vec![Expr::column("first"), Expr::column("last")],
    ));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT CONCAT([first], [last]) FROM [t]");
}

#[test]
fn concat_coalesce_chain_below_threshold() {
    let query = select_expr(Expr::func(
        FuncKind::Concat,
        vec![Expr::column("first"), Expr::column("last")],
    ));
    let (sql, _) = compile(&query, &legacy());
    assert_eq!(
        sql,
        "SELECT COALESCE([first], '') + COALESCE([last], '') FROM [t]"
    );
}

#[test]
fn count_uses_64_bit_function() {
    let query = select_expr(Expr::func(FuncKind::Count, vec![Expr::Wildcard {
        table: None,
    }]));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT COUNT_BIG(*) FROM [t]");
}

#[test]
fn greatest_renders_values_max() {
    let query = select_expr(Expr::func(
        FuncKind::Greatest,
        vec![Expr::integer(3), Expr::integer(7), Expr::integer(2)],
    ));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(
        sql,
        "SELECT (SELECT MAX(value) FROM (VALUES (3), (7), (2)) AS _greatest(value)) FROM [t]"
    );
    // Semantically, MAX over the one-column derived table is 7.
    assert_eq!([3, 7, 2].iter().max(), Some(&7));
}

#[test]
fn least_renders_values_min() {
    let query = select_expr(Expr::func(
        FuncKind::Least,
        vec![Expr::integer(3), Expr::integer(7), Expr::integer(2)],
    ));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(
        sql,
        "SELECT (SELECT MIN(value) FROM (VALUES (3), (7), (2)) AS _least(value)) FROM [t]"
    );
    assert_eq!([3, 7, 2].iter().min(), Some(&2));
}

#[test]
fn length_uses_len() {
    let query = select_expr(Expr::func(FuncKind::Length, vec![Expr::column("name")]));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT LEN([name]) FROM [t]");
}

#[test]
fn repeat_uses_replicate() {
    let query = select_expr(Expr::func(
        FuncKind::Repeat,
        vec![Expr::string("ab"), Expr::integer(3)],
    ));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT REPLICATE('ab', 3) FROM [t]");
}

#[test]
fn strindex_reverses_to_charindex() {
    // Generic operand order is (haystack, needle); CHARINDEX wants the
    // reverse.
    let query = select_expr(Expr::func(
        FuncKind::StrIndex,
        vec![Expr::column("body"), Expr::string("x")],
    ));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT CHARINDEX('x', [body]) FROM [t]");
}

#[test]
fn rewrites_leave_the_tree_untouched() {
    let expr = Expr::func(
        FuncKind::StrIndex,
        vec![Expr::column("body"), Expr::string("x")],
    );
    let before = expr.clone();
    let query = select_expr(expr);
    let _ = compile(&query, &modern());
    let _ = compile(&query, &modern());
    assert_eq!(query.columns[0].expr, before);
}

#[test]
fn trim_nests_ltrim_rtrim() {
    let query = select_expr(Expr::func(FuncKind::Trim, vec![Expr::column("name")]));
    let (sql, _) = compile(&query, &modern());
    assert_eq!(sql, "SELECT LTRIM(RTRIM([name])) FROM [t]");
}

#[test]
fn json_path_coalesces_query_and_value() {
    let query = select_expr(Expr::JsonPath {
        target: Box::new(Expr::column("payload")),
        keys: vec![String::from("user"), String::from("id")],
    });
    let (sql, _) = compile(&query, &modern());
    assert_eq!(
        sql,
        "SELECT COALESCE(JSON_QUERY([payload], '$.\"user\".\"id\"'), \
         JSON_VALUE([payload], '$.\"user\".\"id\"')) FROM [t]"
    );
}

// The REPLICATE/LEFT pad emulation, evaluated with string semantics to pin
// down what the generated SQL computes.

fn lpad(source: &str, length: usize, fill: &str) -> String {
    // LEFT(LEFT(REPLICATE(fill, length), needed) + source, length) where
    // needed = max(0, length - LEN(source)).
    let replicated: String = fill.repeat(length);
    let needed = length.saturating_sub(source.chars().count());
    let pad: String = replicated.chars().take(needed).collect();
    format!("{pad}{source}").chars().take(length).collect()
}

fn rpad(source: &str, length: usize, fill: &str) -> String {
    let replicated: String = fill.repeat(length);
    format!("{source}{replicated}").chars().take(length).collect()
}

#[test]
fn lpad_emulation_semantics() {
    assert_eq!(lpad("7", 3, "0"), "007");
    assert_eq!(lpad("abcdef", 3, "0"), "abc");
    assert_eq!(lpad("ab", 5, "xy"), "xyxab");
}

#[test]
fn rpad_emulation_semantics() {
    assert_eq!(rpad("ab", 5, "x"), "abxxx");
    assert_eq!(rpad("abcdef", 3, "x"), "abc");
}

#[test]
fn lpad_compiles_with_duplicated_params() {
    let query = select_expr(Expr::func(
        FuncKind::LPad,
        vec![
            Expr::value("7"),
            Expr::value(3_i64),
            Expr::value("0"),
        ],
    ));
    let (sql, params) = compile(&query, &modern());
    assert_balanced(&sql, &params);
    // source x3, length x4, fill x1
    assert_eq!(params.len(), 8);
}

#[test]
fn rpad_compiles_with_duplicated_params() {
    let query = select_expr(Expr::func(
        FuncKind::RPad,
        vec![
            Expr::value("ab"),
            Expr::value(5_i64),
            Expr::value("x"),
        ],
    ));
    let (sql, params) = compile(&query, &modern());
    assert_balanced(&sql, &params);
    assert_eq!(params.len(), 4);
}
