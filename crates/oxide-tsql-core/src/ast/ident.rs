//! Identifier quoting and JSON path construction.

use super::statement::TableName;

/// Quotes an identifier with T-SQL brackets.
#[must_use]
pub fn quote(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Quotes a column reference, optionally qualified by a table alias.
#[must_use]
pub fn quote_column(table: Option<&str>, name: &str) -> String {
    match table {
        Some(t) => format!("{}.{}", quote(t), quote(name)),
        None => quote(name),
    }
}

/// Quotes a table name, prefixing the schema when one is declared.
#[must_use]
pub fn quote_table(table: &TableName) -> String {
    match &table.schema {
        Some(schema) => format!("{}.{}", quote(schema), quote(&table.name)),
        None => quote(&table.name),
    }
}

/// Builds a JSON path literal body from a key chain.
///
/// Numeric keys index arrays, everything else member-accesses by name.
#[must_use]
pub fn json_path(keys: &[String]) -> String {
    let mut path = String::from("$");
    for key in keys {
        if key.parse::<u64>().is_ok() {
            path.push_str(&format!("[{key}]"));
        } else {
            path.push_str(&format!(".\"{}\"", key.replace('"', "\\\"")));
        }
    }
    path
}
