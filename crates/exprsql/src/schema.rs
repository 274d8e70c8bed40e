//! Table and column metadata.
//!
//! Record types describe their SQL shape once, as plain data, through the
//! [`Table`] trait (normally via `#[derive(Table)]`). [`TableMeta::of`]
//! validates that shape at construction time; everything downstream consumes
//! it read-only, so no per-row introspection ever happens during compilation.

use crate::error::{SqlError, SqlResult};
use crate::value::SqlValue;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Static description of one column of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ColumnDef {
    /// Field name on the record type
    pub field: &'static str,
    /// SQL column name (defaults to the field name unless overridden)
    pub column: &'static str,
    /// Part of the primary key
    pub primary_key: bool,
    /// Value assigned by the database on insert
    pub auto_increment: bool,
}

impl ColumnDef {
    /// A plain column: SQL name equals the field name, no key flags.
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            column: field,
            primary_key: false,
            auto_increment: false,
        }
    }

    /// Columns assigned by the database must never appear in insert tuples.
    pub fn is_generated(&self) -> bool {
        self.primary_key && self.auto_increment
    }
}

/// Schema description a record type provides about itself.
///
/// `values` must return one [`SqlValue`] per entry of `columns`, in the same
/// order.
pub trait Table: 'static {
    /// SQL table name. Defaults to the type's own name unless overridden.
    const TABLE: &'static str;

    /// Column descriptions, in declaration order.
    fn columns() -> &'static [ColumnDef];

    /// This record's values, aligned with [`Table::columns`].
    fn values(&self) -> Vec<SqlValue>;

    /// SQL table name, as a method for use through generics.
    fn table_name() -> &'static str {
        Self::TABLE
    }
}

/// Resolved metadata for a record type.
///
/// Immutable after construction; safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    table: &'static str,
    columns: &'static [ColumnDef],
}

impl TableMeta {
    /// Resolve metadata for a record type.
    ///
    /// Fails if the type declares zero columns; that is a construction error,
    /// never raised mid-compile.
    pub fn of<T: Table>() -> SqlResult<Self> {
        let columns = T::columns();
        if columns.is_empty() {
            return Err(SqlError::metadata(
                T::TABLE,
                "record type declares no columns",
            ));
        }
        Ok(Self {
            table: T::TABLE,
            columns,
        })
    }

    /// SQL table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// All column descriptions.
    pub fn columns(&self) -> &'static [ColumnDef] {
        self.columns
    }

    /// Look up a column by its field name.
    pub fn column_for(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Resolve a field name to its SQL column name, erroring on unknown fields.
    pub fn sql_column(&self, field: &str) -> SqlResult<&'static str> {
        self.column_for(field).map(|c| c.column).ok_or_else(|| {
            SqlError::metadata(self.table, format!("no column for field '{field}'"))
        })
    }

    /// Primary key columns, in declaration order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// Columns that participate in insert tuples, with their value index.
    pub fn insert_columns(&self) -> impl Iterator<Item = (usize, &ColumnDef)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_generated())
    }
}

/// Cross-call cache of resolved [`TableMeta`], keyed by record type.
///
/// Schema facts are immutable after first resolution, so the cache is
/// read-mostly: each key is written at most once and concurrent callers race
/// only to establish the shared instance.
#[derive(Debug, Default)]
pub struct MetaCache {
    inner: Mutex<HashMap<TypeId, Arc<TableMeta>>>,
}

impl MetaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the cached metadata for `T`, resolving and inserting it on first use.
    pub fn get_or_resolve<T: Table>(&self) -> SqlResult<Arc<TableMeta>> {
        let key = TypeId::of::<T>();
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.get(&key) {
            return Ok(existing.clone());
        }
        let meta = Arc::new(TableMeta::of::<T>()?);
        inner.insert(key, meta.clone());
        Ok(meta)
    }

    /// Number of record types currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
