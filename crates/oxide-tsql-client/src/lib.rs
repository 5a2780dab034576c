//! # oxide-tsql-client
//!
//! Execution layer for statements compiled by `oxide-tsql-core`: TDS
//! connection establishment, capability introspection, parameter binding,
//! and chunked cursor materialization.
//!
//! ```rust,no_run
//! use oxide_tsql_client::{connect, introspect, query_rows, ConnectOptions};
//! use oxide_tsql_core::ast::{Expr, SelectQuery};
//! use oxide_tsql_core::SelectCompiler;
//!
//! # async fn run() -> oxide_tsql_client::Result<()> {
//! let options = ConnectOptions::new("localhost").credentials("sa", "secret");
//! let mut client = connect(&options).await?;
//! let caps = introspect(&mut client).await?;
//!
//! let query = SelectQuery::from_table("users")
//!     .column(Expr::column("id"))
//!     .filter(Expr::column("active").eq(Expr::value(true)));
//! let (sql, params) = SelectCompiler::new(&query, &caps).compile()?;
//!
//! let rows = query_rows(&mut client, &sql, &params).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod cursor;
pub mod error;
pub mod executor;

pub use connection::{connect, introspect, ConnectOptions, MssqlClient};
pub use cursor::{RowChunks, RowSource, DEFAULT_CHUNK_SIZE};
pub use error::{ClientError, Result};
pub use executor::{execute, query_rows, run_insert};
