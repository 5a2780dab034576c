//! # oxide-tsql-core
//!
//! A capability-gated T-SQL statement compiler: lowers an abstract,
//! backend-neutral query tree into SQL Server dialect text plus positional
//! bind values.
//!
//! The same logical query produces different, correct SQL depending on the
//! engine's version tier (`TOP` vs `OFFSET ... FETCH` vs `ROW_NUMBER()`
//! pagination, native vs emulated string functions) while preserving row
//! counts, ordering, NULL handling, and parameter binding exactly.
//!
//! ## Compiling a statement
//!
//! ```rust
//! use oxide_tsql_core::ast::{Expr, SelectQuery};
//! use oxide_tsql_core::{Capabilities, SelectCompiler};
//!
//! let query = SelectQuery::from_table("users")
//!     .column(Expr::column("id"))
//!     .column(Expr::column("name"))
//!     .filter(Expr::column("active").eq(Expr::value(true)));
//!
//! let caps = Capabilities::default();
//! let (sql, params) = SelectCompiler::new(&query, &caps).compile().unwrap();
//!
//! assert_eq!(sql, "SELECT [id], [name] FROM [users] WHERE [active] = ?");
//! assert_eq!(params.len(), 1);
//! ```
//!
//! ## The fragment invariant
//!
//! Every compiled fragment carries its placeholders and bind values in
//! lockstep: the number of `?` markers always equals the number of
//! parameters, in order. The [`fragment::Fragment`] API makes violating
//! this structurally hard: text and values can only grow together.

pub mod ast;
pub mod capability;
pub mod compiler;
pub mod error;
pub mod fragment;
mod rewrite;

pub use ast::{Expr, SelectQuery, SqlValue};
pub use capability::Capabilities;
pub use compiler::{DeleteCompiler, ExprCompiler, InsertCompiler, SelectCompiler, UpdateCompiler};
pub use error::{CompileError, Result};
pub use fragment::Fragment;
