#![allow(dead_code)]

use oxide_tsql_core::ast::SelectQuery;
use oxide_tsql_core::fragment::count_placeholders;
use oxide_tsql_core::{Capabilities, CompileError, SelectCompiler, SqlValue};

pub fn modern() -> Capabilities {
    Capabilities::default()
}

pub fn legacy() -> Capabilities {
    Capabilities::for_version(2008)
}

pub fn compile(query: &SelectQuery, caps: &Capabilities) -> (String, Vec<SqlValue>) {
    SelectCompiler::new(query, caps)
        .compile()
        .unwrap_or_else(|e| panic!("Failed to compile: {query:?}\nError: {e:?}"))
}

pub fn compile_err(query: &SelectQuery, caps: &Capabilities) -> CompileError {
    match SelectCompiler::new(query, caps).compile() {
        Ok((sql, _)) => panic!("Expected compile error, got: {sql}"),
        Err(e) => e,
    }
}

/// Asserts the placeholder/parameter invariant on a compiled statement.
pub fn assert_balanced(sql: &str, params: &[SqlValue]) {
    assert_eq!(
        count_placeholders(sql),
        params.len(),
        "placeholder/parameter skew in: {sql}"
    );
}
