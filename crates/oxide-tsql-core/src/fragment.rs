//! Compiled SQL fragments.
//!
//! A [`Fragment`] carries SQL text together with the bind values for its
//! placeholders. The invariant every renderer must preserve: the number of
//! `?` markers in the text equals the number of parameters, left to right.
//! The API enforces this structurally: a placeholder can only enter the
//! text through [`Fragment::push_param`] (which appends the value in the
//! same call) or through [`Fragment::append`] of another fragment, so text
//! and parameters cannot drift apart.

use crate::ast::value::SqlValue;

/// A composable piece of compiled SQL: text plus ordered bind values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    sql: String,
    params: Vec<SqlValue>,
}

impl Fragment {
    /// Creates an empty fragment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment from placeholder-free SQL text.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        debug_assert!(
            count_placeholders(&sql) == 0,
            "raw fragments must not contain placeholders"
        );
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Creates a fragment from SQL text with matching pre-ordered parameters.
    ///
    /// # Panics
    ///
    /// Panics when the placeholder count does not match the parameter count.
    #[must_use]
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        let sql = sql.into();
        assert_eq!(
            count_placeholders(&sql),
            params.len(),
            "placeholder/parameter count mismatch"
        );
        Self { sql, params }
    }

    /// Creates a single-placeholder fragment binding `value`.
    #[must_use]
    pub fn param(value: SqlValue) -> Self {
        Self {
            sql: String::from(SqlValue::placeholder()),
            params: vec![value],
        }
    }

    /// Appends placeholder-free SQL text.
    pub fn push_sql(&mut self, sql: &str) {
        debug_assert!(
            count_placeholders(sql) == 0,
            "use push_param to add placeholders"
        );
        self.sql.push_str(sql);
    }

    /// Appends a placeholder and its bind value in one step.
    pub fn push_param(&mut self, value: SqlValue) {
        self.sql.push_str(SqlValue::placeholder());
        self.params.push(value);
    }

    /// Appends another fragment, text and parameters in lockstep.
    pub fn append(&mut self, other: Self) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    /// Joins fragments with a separator.
    #[must_use]
    pub fn join(parts: Vec<Self>, separator: &str) -> Self {
        let mut out = Self::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push_sql(separator);
            }
            out.append(part);
        }
        out
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bind values.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns whether the fragment holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Returns the number of placeholders in the text.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    /// Consumes the fragment into `(sql, params)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

/// Counts `?` placeholders, ignoring any inside single-quoted literals
/// (a doubled `''` escape closes and reopens the literal, which this scan
/// handles for free).
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut in_string = false;
    for ch in sql.chars() {
        match ch {
            '\'' => in_string = !in_string,
            '?' if !in_string => count += 1,
            _ => {}
        }
    }
    count
}

/// Rewrites `?` placeholders to the `@P1..@Pn` convention of the TDS
/// protocol, numbering left to right and leaving quoted literals alone.
#[must_use]
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut n = 0_usize;
    let mut in_string = false;
    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_string = !in_string;
                out.push(ch);
            }
            '?' if !in_string => {
                n += 1;
                out.push_str(&format!("@P{n}"));
            }
            _ => out.push(ch),
        }
    }
    out
}
