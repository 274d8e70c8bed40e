//! Repository boundary over the compiler.
//!
//! [`Repository`] ties a record type to an [`Executor`]: predicates compile
//! to `SELECT` statements and run through [`Executor::query`]; row batches
//! compile to chunked DML and run through [`Executor::execute`], summing
//! affected rows and aborting on the first failed chunk.

use crate::analyze::{Analysis, ArgMap, DEFAULT_ALIAS, analyze};
use crate::batch::{DEFAULT_CHUNK, insert_statements, update_statements};
use crate::client::Executor;
use crate::error::SqlResult;
use crate::expr::Expr;
use crate::schema::{Table, TableMeta};
use crate::select::build_select;
use std::marker::PhantomData;

/// A typed repository over one record type and one executor.
pub struct Repository<T: Table, E: Executor> {
    meta: TableMeta,
    alias: String,
    executor: E,
    _record: PhantomData<fn() -> T>,
}

impl<T: Table, E: Executor> Repository<T, E> {
    /// Create a repository, resolving the record type's metadata once.
    pub fn new(executor: E) -> SqlResult<Self> {
        Ok(Self {
            meta: TableMeta::of::<T>()?,
            alias: DEFAULT_ALIAS.to_string(),
            executor,
            _record: PhantomData,
        })
    }

    /// Use a different alias for the filtered table in emitted SQL.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Resolved metadata for the record type.
    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Compile a predicate to SQL without executing it.
    ///
    /// `limit = 0` means unlimited.
    pub fn compile_find(&self, filter: &Expr, args: &ArgMap, limit: u64) -> SqlResult<String> {
        let analysis = self.analyze(filter, args)?;
        Ok(self.assemble(&analysis, limit))
    }

    /// Analyze a predicate, exposing the token stream, table map, and
    /// parameter echo map.
    pub fn analyze(&self, filter: &Expr, args: &ArgMap) -> SqlResult<Analysis> {
        analyze(filter, &self.meta, &self.alias, args)
    }

    fn assemble(&self, analysis: &Analysis, limit: u64) -> String {
        build_select(
            &self.meta,
            analysis,
            &self.alias,
            self.executor.dialect(),
            limit,
        )
    }

    /// Fetch every row matching the predicate.
    pub async fn find(&self, filter: &Expr) -> SqlResult<Vec<E::Row>> {
        self.find_with_args(filter, &ArgMap::new()).await
    }

    /// Fetch every row matching the predicate, resolving value-side member
    /// references from `args`.
    pub async fn find_with_args(&self, filter: &Expr, args: &ArgMap) -> SqlResult<Vec<E::Row>> {
        let sql = self.compile_find(filter, args, 0)?;
        tracing::debug!(table = self.meta.table(), %sql, "find");
        self.executor.query(&sql).await
    }

    /// Fetch the first row matching the predicate, if any.
    pub async fn find_first(&self, filter: &Expr) -> SqlResult<Option<E::Row>> {
        self.find_first_with_args(filter, &ArgMap::new()).await
    }

    /// Fetch the first row matching the predicate, resolving value-side
    /// member references from `args`.
    pub async fn find_first_with_args(
        &self,
        filter: &Expr,
        args: &ArgMap,
    ) -> SqlResult<Option<E::Row>> {
        let sql = self.compile_find(filter, args, 1)?;
        tracing::debug!(table = self.meta.table(), %sql, "find_first");
        let mut rows = self.executor.query(&sql).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Insert the rows in chunks of [`DEFAULT_CHUNK`], returning the total
    /// affected-row count.
    pub async fn batch_insert(&self, rows: &[T]) -> SqlResult<u64> {
        self.batch_insert_chunked(rows, DEFAULT_CHUNK).await
    }

    /// Insert the rows in chunks of at most `max_chunk` rows per statement.
    ///
    /// Chunks run in order; the first failure aborts the remainder. Rows
    /// affected by already-executed chunks are not rolled back here — that is
    /// the executor's transactional responsibility.
    pub async fn batch_insert_chunked(&self, rows: &[T], max_chunk: usize) -> SqlResult<u64> {
        self.run_batch(insert_statements(rows, max_chunk)?).await
    }

    /// Update the rows in chunks of [`DEFAULT_CHUNK`], joining on the primary
    /// key, returning the total affected-row count.
    pub async fn batch_update(&self, rows: &[T]) -> SqlResult<u64> {
        self.batch_update_chunked(rows, DEFAULT_CHUNK).await
    }

    /// Update the rows in chunks of at most `max_chunk` rows per statement.
    pub async fn batch_update_chunked(&self, rows: &[T], max_chunk: usize) -> SqlResult<u64> {
        self.run_batch(update_statements(rows, max_chunk)?).await
    }

    async fn run_batch(&self, statements: Vec<String>) -> SqlResult<u64> {
        let mut affected = 0;
        for sql in statements {
            tracing::debug!(table = self.meta.table(), %sql, "batch statement");
            affected += self.executor.execute(&sql).await?;
        }
        Ok(affected)
    }
}
