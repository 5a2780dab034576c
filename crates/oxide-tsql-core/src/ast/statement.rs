//! Statement-level query tree types.

use super::expression::Expr;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Creates an ascending ordering.
    #[must_use]
    pub const fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDirection::Asc,
        }
    }

    /// Creates a descending ordering.
    #[must_use]
    pub const fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: OrderDirection::Desc,
        }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
    /// CROSS JOIN.
    Cross,
}

impl JoinType {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT OUTER JOIN",
            Self::Right => "RIGHT OUTER JOIN",
            Self::Full => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    /// Namespace/schema the table lives in, when it differs from the
    /// connection default.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableName {
    /// Creates an unqualified table name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Creates a schema-qualified table name.
    #[must_use]
    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

/// A join attached to a FROM entry.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// The type of join.
    pub join_type: JoinType,
    /// The join condition (absent for CROSS joins).
    pub on: Option<Expr>,
}

/// One entry of the FROM clause: the driving table or a joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct FromSource {
    /// The referenced table.
    pub table: TableName,
    /// Alias assigned by the query builder.
    pub alias: Option<String>,
    /// Join information; `None` marks the driving table.
    pub join: Option<JoinClause>,
}

impl FromSource {
    /// Creates a driving-table entry.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: TableName::new(name),
            alias: None,
            join: None,
        }
    }

    /// Creates a joined-table entry.
    #[must_use]
    pub fn join(name: impl Into<String>, join_type: JoinType, on: Expr) -> Self {
        Self {
            table: TableName::new(name),
            alias: None,
            join: Some(JoinClause {
                join_type,
                on: Some(on),
            }),
        }
    }

    /// Adds an alias to this entry.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the name this entry is referenced by elsewhere in the query.
    #[must_use]
    pub fn effective_alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table.name)
    }
}

/// A column in the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Creates a new select column.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Creates a select column with an alias.
    #[must_use]
    pub fn with_alias(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// A set-operation combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// UNION / UNION ALL.
    Union {
        /// Whether duplicates are kept.
        all: bool,
    },
    /// INTERSECT.
    Intersect,
    /// EXCEPT.
    Except,
}

impl Combinator {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union { all: false } => "UNION",
            Self::Union { all: true } => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }

    /// Returns the bare operation name, for error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Union { .. } => "union",
            Self::Intersect => "intersection",
            Self::Except => "difference",
        }
    }
}

/// Row-locking options requested for a SELECT.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowLocking {
    /// Fail immediately instead of waiting for conflicting locks.
    pub nowait: bool,
    /// Skip rows that are already locked.
    pub skip_locked: bool,
    /// Restrict locking to the given tables.
    pub of: Vec<String>,
}

/// A SELECT query tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    /// Whether to select DISTINCT rows.
    pub distinct: bool,
    /// Per-field DISTINCT (DISTINCT ON equivalent); unsupported by this
    /// dialect but carried so the compiler can reject it precisely.
    pub distinct_on: Vec<String>,
    /// The columns to select.
    pub columns: Vec<SelectColumn>,
    /// Ordering-only columns forced into the select list upstream (e.g. by
    /// combining DISTINCT with ORDER BY); hidden again when the statement is
    /// used as a subquery.
    pub extra_columns: Vec<SelectColumn>,
    /// FROM entries: the driving table first, joined tables after.
    pub from: Vec<FromSource>,
    /// WHERE predicate.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions (pre-legalization).
    pub group_by: Vec<Expr>,
    /// HAVING predicate.
    pub having: Option<Expr>,
    /// ORDER BY entries.
    pub order_by: Vec<OrderBy>,
    /// 0-based index of the first row to return.
    pub low_mark: u64,
    /// Exclusive upper bound row index, when limited.
    pub high_mark: Option<u64>,
    /// Set-operation combinator; when present, `combined` holds the member
    /// queries and the other clauses are ignored.
    pub combinator: Option<Combinator>,
    /// Member queries of a combined statement.
    pub combined: Vec<SelectQuery>,
    /// Row-locking request.
    pub locking: Option<RowLocking>,
    /// Whether to emit the engine's plan-explanation prefix.
    pub explain: bool,
    /// Whether this statement is embedded as a subquery.
    pub subquery: bool,
    /// Primary-key column of the driving table, used as the fallback
    /// ordering key for offset emulation.
    pub pk_column: Option<String>,
}

impl SelectQuery {
    /// Creates a query selecting from a single table.
    #[must_use]
    pub fn from_table(name: impl Into<String>) -> Self {
        Self {
            from: vec![FromSource::table(name)],
            ..Self::default()
        }
    }

    /// Adds a select column.
    #[must_use]
    pub fn column(mut self, expr: Expr) -> Self {
        self.columns.push(SelectColumn::new(expr));
        self
    }

    /// Adds an aliased select column.
    #[must_use]
    pub fn column_as(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.columns.push(SelectColumn::with_alias(expr, alias));
        self
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    /// Adds an ORDER BY entry.
    #[must_use]
    pub fn order_by(mut self, entry: OrderBy) -> Self {
        self.order_by.push(entry);
        self
    }

    /// Restricts the result to the row window `[low, high)`.
    #[must_use]
    pub const fn slice(mut self, low: u64, high: Option<u64>) -> Self {
        self.low_mark = low;
        self.high_mark = high;
        self
    }

    /// Sets the driving table's primary-key column.
    #[must_use]
    pub fn pk(mut self, column: impl Into<String>) -> Self {
        self.pk_column = Some(column.into());
        self
    }
}

/// Source of rows for an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// Explicit value rows.
    Values(Vec<Vec<Expr>>),
    /// All-defaults rows.
    DefaultValues {
        /// Number of default rows to insert.
        rows: usize,
    },
}

/// An INSERT query tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    /// Target table.
    pub table: TableName,
    /// Column names; empty for all-defaults inserts.
    pub columns: Vec<String>,
    /// Row source.
    pub source: InsertSource,
    /// Columns whose generated values the caller wants back.
    pub returning: Vec<String>,
    /// Auto-generated key column of the target table, if any.
    pub pk_column: Option<String>,
}

impl InsertQuery {
    /// Creates an insert of explicit rows.
    #[must_use]
    pub fn new(table: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Expr>>) -> Self {
        Self {
            table: TableName::new(table),
            columns,
            source: InsertSource::Values(rows),
            returning: Vec::new(),
            pk_column: None,
        }
    }

    /// Creates an all-defaults insert of `rows` rows.
    #[must_use]
    pub fn defaults(table: impl Into<String>, rows: usize) -> Self {
        Self {
            table: TableName::new(table),
            columns: Vec::new(),
            source: InsertSource::DefaultValues { rows },
            returning: Vec::new(),
            pk_column: None,
        }
    }

    /// Requests returned columns.
    #[must_use]
    pub fn returning(mut self, columns: Vec<String>) -> Self {
        self.returning = columns;
        self
    }

    /// Declares the auto-generated key column.
    #[must_use]
    pub fn pk(mut self, column: impl Into<String>) -> Self {
        self.pk_column = Some(column.into());
        self
    }
}

/// An assignment in UPDATE SET.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name.
    pub column: String,
    /// Value expression.
    pub value: Expr,
}

impl Assignment {
    /// Creates a new assignment.
    #[must_use]
    pub fn new(column: impl Into<String>, value: Expr) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// An UPDATE query tree.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    /// Target table.
    pub table: TableName,
    /// SET assignments.
    pub assignments: Vec<Assignment>,
    /// WHERE predicate.
    pub where_clause: Option<Expr>,
}

impl UpdateQuery {
    /// Creates an update with no assignments.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: TableName::new(table),
            assignments: Vec::new(),
            where_clause: None,
        }
    }

    /// Adds a SET assignment.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: Expr) -> Self {
        self.assignments.push(Assignment::new(column, value));
        self
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}

/// A DELETE query tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    /// Target table.
    pub table: TableName,
    /// WHERE predicate.
    pub where_clause: Option<Expr>,
}

impl DeleteQuery {
    /// Creates a delete of all rows.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: TableName::new(table),
            where_clause: None,
        }
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}
