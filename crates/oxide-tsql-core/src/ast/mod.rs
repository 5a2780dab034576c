//! Query tree types consumed by the statement compilers.

pub mod expression;
pub mod ident;
pub mod statement;
pub mod value;

pub use expression::{BinaryOp, Expr, FuncKind, Literal, UnaryOp, WindowFrame};
pub use statement::{
    Assignment, Combinator, DeleteQuery, FromSource, InsertQuery, InsertSource, JoinClause,
    JoinType, OrderBy, OrderDirection, RowLocking, SelectColumn, SelectQuery, TableName,
    UpdateQuery,
};
pub use value::{SqlValue, ToSqlValue};
