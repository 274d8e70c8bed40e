//! # exprsql
//!
//! A predicate-to-SQL compiler with batch DML generation.
//!
//! ## Features
//!
//! - **Typed predicates**: build filters as an [`Expr`] tree with comparison
//!   and string-match combinators, no SQL strings in caller code
//! - **Deterministic emission**: analysis produces a typed token stream, table
//!   map, and parameter echo map before any text is assembled
//! - **Dialect-aware**: `SELECT TOP n` for SQL Server, trailing `LIMIT n` for
//!   MySQL
//! - **Batch DML**: multi-row `INSERT` and derived-table bulk `UPDATE`,
//!   chunked so single statements stay bounded
//! - **Minimal magic**: a `#[derive(Table)]` for column metadata, traits for
//!   the execution boundary, nothing else
//!
//! ## Compiling a predicate
//!
//! ```ignore
//! use exprsql::{col, ArgMap, Repository, Table};
//!
//! #[derive(Table)]
//! struct Person {
//!     #[sql(primary_key, auto_increment)]
//!     id: i64,
//!     name: String,
//!     age: i32,
//! }
//!
//! let repo = Repository::<Person, _>::new(executor)?;
//! let adults = repo
//!     .find(&col("age").ge(18).and(col("name").starts_with("A")))
//!     .await?;
//! ```

pub mod analyze;
pub mod batch;
pub mod client;
pub mod error;
pub mod expr;
pub mod repository;
pub mod schema;
pub mod select;
pub mod value;

pub use analyze::{
    Analysis, ArgMap, DEFAULT_ALIAS, ParamMap, TableEntry, TableMap, Token, TokenStream, analyze,
};
pub use batch::{DEFAULT_CHUNK, insert_statements, update_statements};
pub use client::Executor;
pub use error::{SqlError, SqlResult};
pub use expr::{CallKind, CmpOp, Expr, chain, col, lit};
pub use repository::Repository;
pub use schema::{ColumnDef, MetaCache, Table, TableMeta};
pub use select::{Dialect, build_select};
pub use value::{SqlValue, ToSqlValue};

#[cfg(feature = "derive")]
pub use exprsql_derive::Table;
