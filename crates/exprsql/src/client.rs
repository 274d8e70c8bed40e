//! Statement-execution boundary.
//!
//! The compiler emits opaque SQL text; executing it belongs to an external
//! collaborator behind [`Executor`]. The trait mirrors the split the
//! repository needs: queries return the executor's row type, mutations return
//! an affected-row count, and the executor declares which [`Dialect`] its
//! connection speaks.

use crate::error::SqlResult;
use crate::select::Dialect;

/// External statement executor.
///
/// Receives fully rendered SQL text; the compiler never passes bound
/// parameters through this boundary.
pub trait Executor {
    /// Row type produced by queries.
    type Row;

    /// Run a query statement, returning its rows.
    fn query(&self, sql: &str) -> impl Future<Output = SqlResult<Vec<Self::Row>>> + Send;

    /// Run a mutation statement, returning the affected-row count.
    fn execute(&self, sql: &str) -> impl Future<Output = SqlResult<u64>> + Send;

    /// Database family of the active connection.
    fn dialect(&self) -> Dialect;
}
