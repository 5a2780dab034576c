//! Query tree expression types.
//!
//! The tree is produced by an upstream query builder and read immutably by
//! the compiler. Dialect rewrites never modify these nodes; they operate on
//! compiled fragments or on private clones.

use super::statement::{OrderBy, SelectQuery};
use super::value::SqlValue;

/// A literal value carried directly in the tree (rendered inline).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
}

impl Literal {
    /// Returns the T-SQL rendering of this literal.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Integer(n) => SqlValue::Int(*n).to_sql_inline(),
            Self::Float(f) => SqlValue::Float(*f).to_sql_inline(),
            Self::String(s) => SqlValue::Text(s.clone()).to_sql_inline(),
            Self::Boolean(b) => SqlValue::Bool(*b).to_sql_inline(),
            Self::Null => String::from("NULL"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,
    Like,
}

impl BinaryOp {
    /// Returns the T-SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            // T-SQL string concatenation uses + rather than ||.
            Self::Concat => "+",
            Self::Like => "LIKE",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the T-SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// The closed set of function and aggregate kinds the compiler understands.
///
/// Dialect substitution is resolved by a single lookup on this tag; kinds
/// without a dialect rule render generically as `NAME(args)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKind {
    Avg,
    Chr,
    Concat,
    Count,
    Greatest,
    Least,
    Length,
    Lower,
    LPad,
    Max,
    Min,
    Random,
    Repeat,
    RPad,
    StdDev,
    StdDevPop,
    StrIndex,
    Substr,
    Sum,
    Trim,
    Upper,
    Variance,
    VarPop,
}

impl FuncKind {
    /// Returns the backend-neutral function name.
    #[must_use]
    pub const fn generic_name(&self) -> &'static str {
        match self {
            Self::Avg => "AVG",
            Self::Chr => "CHAR",
            Self::Concat => "CONCAT",
            Self::Count => "COUNT",
            Self::Greatest => "GREATEST",
            Self::Least => "LEAST",
            Self::Length => "LENGTH",
            Self::Lower => "LOWER",
            Self::LPad => "LPAD",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::Random => "RAND",
            Self::Repeat => "REPEAT",
            Self::RPad => "RPAD",
            Self::StdDev => "STDDEV",
            Self::StdDevPop => "STDDEV_POP",
            Self::StrIndex => "INSTR",
            Self::Substr => "SUBSTRING",
            Self::Sum => "SUM",
            Self::Trim => "TRIM",
            Self::Upper => "UPPER",
            Self::Variance => "VARIANCE",
            Self::VarPop => "VAR_POP",
        }
    }

    /// Returns whether this kind aggregates over rows.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Self::Avg
                | Self::Count
                | Self::Max
                | Self::Min
                | Self::StdDev
                | Self::StdDevPop
                | Self::Sum
                | Self::Variance
                | Self::VarPop
        )
    }
}

/// Window frame units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    /// ROWS framing.
    Rows,
    /// RANGE framing.
    Range,
}

impl FrameUnits {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
        }
    }
}

/// A window frame bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    /// Returns the SQL rendering of this bound.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::UnboundedPreceding => String::from("UNBOUNDED PRECEDING"),
            Self::Preceding(n) => format!("{n} PRECEDING"),
            Self::CurrentRow => String::from("CURRENT ROW"),
            Self::Following(n) => format!("{n} FOLLOWING"),
            Self::UnboundedFollowing => String::from("UNBOUNDED FOLLOWING"),
        }
    }
}

/// A window frame specification.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    /// Frame units (ROWS or RANGE).
    pub units: FrameUnits,
    /// Frame start bound.
    pub start: FrameBound,
    /// Frame end bound.
    pub end: FrameBound,
}

impl WindowFrame {
    /// Returns the SQL rendering of this frame.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "{} BETWEEN {} AND {}",
            self.units.as_str(),
            self.start.to_sql(),
            self.end.to_sql()
        )
    }
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value, rendered inline.
    Literal(Literal),

    /// A runtime value, bound as a positional parameter.
    Value(SqlValue),

    /// A column reference (optionally qualified with a table alias).
    Column {
        /// Table name or alias (optional).
        table: Option<String>,
        /// Column name.
        name: String,
    },

    /// Wildcard (*) in SELECT.
    Wildcard {
        /// Table qualifier (optional).
        table: Option<String>,
    },

    /// A binary expression.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },

    /// A function or aggregate call.
    Func {
        /// The function kind tag.
        kind: FuncKind,
        /// The arguments.
        args: Vec<Expr>,
        /// Whether DISTINCT was specified (aggregates only).
        distinct: bool,
    },

    /// A window expression (`<expr> OVER (...)`).
    Window {
        /// The windowed expression.
        expr: Box<Expr>,
        /// PARTITION BY expressions.
        partition_by: Vec<Expr>,
        /// Window ordering.
        order_by: Vec<OrderBy>,
        /// Optional frame clause.
        frame: Option<WindowFrame>,
    },

    /// A scalar subquery.
    Subquery(Box<SelectQuery>),

    /// A JSON key path extraction (`target -> k1 -> k2 ...`).
    JsonPath {
        /// The JSON-valued expression.
        target: Box<Expr>,
        /// The key path, outermost first.
        keys: Vec<String>,
    },

    /// IS NULL expression.
    IsNull {
        /// The expression to check.
        expr: Box<Expr>,
        /// Whether this is IS NOT NULL.
        negated: bool,
    },

    /// IN expression.
    In {
        /// The expression to check.
        expr: Box<Expr>,
        /// The list of values or subqueries.
        list: Vec<Expr>,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// BETWEEN expression.
    Between {
        /// The expression to check.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// CASE expression.
    Case {
        /// The operand (if any).
        operand: Option<Box<Expr>>,
        /// WHEN/THEN clauses.
        when_clauses: Vec<(Expr, Expr)>,
        /// ELSE clause.
        else_clause: Option<Box<Expr>>,
    },

    /// Parenthesized expression.
    Paren(Box<Expr>),

    /// A reference to a select-list alias, carrying its source expression.
    Ref {
        /// The alias being referenced.
        name: String,
        /// The aliased expression.
        source: Box<Expr>,
    },

    /// A raw SQL fragment with pre-ordered parameters.
    Raw {
        /// The SQL text (may contain `?` placeholders).
        sql: String,
        /// Parameters matching the placeholders in order.
        params: Vec<SqlValue>,
    },
}

impl Expr {
    /// Creates a new column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Creates a new qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Creates a new integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a new string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a new boolean literal.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates a bind-parameter expression.
    #[must_use]
    pub fn value(value: impl super::value::ToSqlValue) -> Self {
        Self::Value(value.to_sql_value())
    }

    /// Creates a function call expression.
    #[must_use]
    pub fn func(kind: FuncKind, args: Vec<Self>) -> Self {
        Self::Func {
            kind,
            args,
            distinct: false,
        }
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.binary(BinaryOp::Lt, right)
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    /// Returns the direct child expressions of this node.
    ///
    /// This is the traversal contract the compiler relies on; subqueries are
    /// opaque leaves at this level.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Literal(_)
            | Self::Value(_)
            | Self::Column { .. }
            | Self::Wildcard { .. }
            | Self::Subquery(_)
            | Self::Raw { .. } => vec![],
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Unary { operand, .. } => vec![operand],
            Self::Func { args, .. } => args.iter().collect(),
            Self::Window {
                expr,
                partition_by,
                order_by,
                ..
            } => {
                let mut out: Vec<&Self> = vec![expr];
                out.extend(partition_by.iter());
                out.extend(order_by.iter().map(|o| &o.expr));
                out
            }
            Self::JsonPath { target, .. } => vec![target],
            Self::IsNull { expr, .. } => vec![expr],
            Self::In { expr, list, .. } => {
                let mut out: Vec<&Self> = vec![expr];
                out.extend(list.iter());
                out
            }
            Self::Between {
                expr, low, high, ..
            } => vec![expr, low, high],
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut out: Vec<&Self> = vec![];
                if let Some(op) = operand {
                    out.push(op);
                }
                for (when, then) in when_clauses {
                    out.push(when);
                    out.push(then);
                }
                if let Some(els) = else_clause {
                    out.push(els);
                }
                out
            }
            Self::Paren(inner) => vec![inner],
            Self::Ref { source, .. } => vec![source],
        }
    }

    /// Returns whether this expression is recursively constant: a literal or
    /// bind value, or a composite whose every operand is constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Literal(_) | Self::Value(_) => true,
            _ => {
                let children = self.children();
                !children.is_empty() && children.iter().all(|c| c.is_constant())
            }
        }
    }

    /// Returns whether this node is itself a subquery.
    #[must_use]
    pub const fn is_subquery(&self) -> bool {
        matches!(self, Self::Subquery(_))
    }

    /// Returns whether this expression is, or contains at any depth, a
    /// subquery.
    #[must_use]
    pub fn contains_subquery(&self) -> bool {
        self.is_subquery() || self.children().iter().any(|c| c.contains_subquery())
    }

    /// Returns whether this expression contains an aggregate call.
    #[must_use]
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Self::Func { kind, .. } if kind.is_aggregate() => true,
            _ => self.children().iter().any(|c| c.contains_aggregate()),
        }
    }

    /// Returns whether this expression contains a window expression.
    #[must_use]
    pub fn contains_window(&self) -> bool {
        matches!(self, Self::Window { .. })
            || self.children().iter().any(|c| c.contains_window())
    }

    /// Returns whether this predicate is trivially always true.
    #[must_use]
    pub const fn is_trivially_true(&self) -> bool {
        matches!(self, Self::Literal(Literal::Boolean(true)))
    }

    /// Returns whether this predicate is trivially always false.
    #[must_use]
    pub const fn is_trivially_false(&self) -> bool {
        matches!(self, Self::Literal(Literal::Boolean(false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_builders() {
        let col = Expr::column("name");
        assert!(matches!(col, Expr::Column { name, .. } if name == "name"));

        let lit = Expr::integer(42);
        assert!(matches!(lit, Expr::Literal(Literal::Integer(42))));
    }

    #[test]
    fn test_constant_classification() {
        assert!(Expr::integer(1).is_constant());
        assert!(Expr::value(5_i64).is_constant());
        assert!(!Expr::column("a").is_constant());

        // A function over only constant leaves is itself constant.
        let f = Expr::func(FuncKind::Upper, vec![Expr::string("x")]);
        assert!(f.is_constant());

        let g = Expr::func(FuncKind::Upper, vec![Expr::column("a")]);
        assert!(!g.is_constant());
    }

    #[test]
    fn test_aggregate_detection_nests() {
        let agg = Expr::func(FuncKind::Count, vec![Expr::column("id")]);
        let nested = Expr::func(FuncKind::Upper, vec![agg]);
        assert!(nested.contains_aggregate());
        assert!(!Expr::column("id").contains_aggregate());
    }

    #[test]
    fn test_trivial_predicates() {
        assert!(Expr::boolean(true).is_trivially_true());
        assert!(Expr::boolean(false).is_trivially_false());
        assert!(!Expr::column("a").is_trivially_true());
    }
}
