//! Batch DML statement generation.
//!
//! Builds multi-row literal-valued `INSERT` statements and derived-table
//! `UPDATE ... INNER JOIN` statements for bulk updates, paginating large row
//! lists into fixed-size chunks so single statements stay within engine
//! length limits.
//!
//! The column set comes from the static record type, never from individual
//! rows, so a batch is homogeneous by construction.

use crate::error::{SqlError, SqlResult};
use crate::schema::{Table, TableMeta};
use crate::value::SqlValue;

/// Default maximum rows per generated statement.
pub const DEFAULT_CHUNK: usize = 100_000;

/// Build the chunked `INSERT` statements for a row list.
///
/// Columns flagged both primary-key and auto-increment are omitted from the
/// column list and from every value tuple. Produces `ceil(rows / max_chunk)`
/// statements; an empty row list produces none.
pub fn insert_statements<T: Table>(rows: &[T], max_chunk: usize) -> SqlResult<Vec<String>> {
    if max_chunk == 0 {
        return Err(SqlError::validation("max_chunk must be greater than zero"));
    }
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let meta = TableMeta::of::<T>()?;
    let insert_cols: Vec<_> = meta.insert_columns().collect();
    if insert_cols.is_empty() {
        return Err(SqlError::metadata(
            meta.table(),
            "every column is database-generated; nothing to insert",
        ));
    }

    let col_list = insert_cols
        .iter()
        .map(|(_, c)| c.column)
        .collect::<Vec<_>>()
        .join(",");

    let mut statements = Vec::with_capacity(rows.len().div_ceil(max_chunk));
    for chunk in rows.chunks(max_chunk) {
        let mut tuples = Vec::with_capacity(chunk.len());
        for row in chunk {
            let values = row_values(&meta, row)?;
            let tuple = insert_cols
                .iter()
                .map(|(i, _)| values[*i].render())
                .collect::<Vec<_>>()
                .join(",");
            tuples.push(format!("({tuple})"));
        }
        statements.push(format!(
            "INSERT INTO {} ({col_list}) VALUES {}",
            meta.table(),
            tuples.join(",")
        ));
    }
    Ok(statements)
}

/// Build the chunked bulk-`UPDATE` statements for a row list.
///
/// Each statement joins the target table against a derived
/// `SELECT ... UNION ALL SELECT ...` row source on the primary key columns
/// and assigns every non-key column. Every derived value is aliased
/// `AS column` so the join references columns symbolically.
pub fn update_statements<T: Table>(rows: &[T], max_chunk: usize) -> SqlResult<Vec<String>> {
    if max_chunk == 0 {
        return Err(SqlError::validation("max_chunk must be greater than zero"));
    }
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let meta = TableMeta::of::<T>()?;
    let pks: Vec<_> = meta.primary_keys().collect();
    if pks.is_empty() {
        return Err(SqlError::metadata(
            meta.table(),
            "bulk update requires a primary key to join on",
        ));
    }
    let set_cols: Vec<_> = meta.columns().iter().filter(|c| !c.primary_key).collect();
    if set_cols.is_empty() {
        return Err(SqlError::metadata(
            meta.table(),
            "every column is part of the primary key; nothing to update",
        ));
    }

    let on_clause = pks
        .iter()
        .map(|c| format!("a.{0}=b.{0}", c.column))
        .collect::<Vec<_>>()
        .join(" AND ");
    let set_clause = set_cols
        .iter()
        .map(|c| format!("a.{0}=b.{0}", c.column))
        .collect::<Vec<_>>()
        .join(",");

    let mut statements = Vec::with_capacity(rows.len().div_ceil(max_chunk));
    for chunk in rows.chunks(max_chunk) {
        let mut selects = Vec::with_capacity(chunk.len());
        for row in chunk {
            let values = row_values(&meta, row)?;
            let items = meta
                .columns()
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{} AS {}", values[i].render(), c.column))
                .collect::<Vec<_>>()
                .join(",");
            selects.push(format!("SELECT {items}"));
        }
        statements.push(format!(
            "UPDATE {} a INNER JOIN ( {} ) b ON {on_clause} SET {set_clause}",
            meta.table(),
            selects.join(" UNION ALL ")
        ));
    }
    Ok(statements)
}

fn row_values<T: Table>(meta: &TableMeta, row: &T) -> SqlResult<Vec<SqlValue>> {
    let values = row.values();
    if values.len() != meta.columns().len() {
        return Err(SqlError::metadata(
            meta.table(),
            format!(
                "row produced {} values for {} columns",
                values.len(),
                meta.columns().len()
            ),
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;
    use crate::value::ToSqlValue;

    struct Person {
        id: i64,
        name: String,
    }

    impl Table for Person {
        const TABLE: &'static str = "Person";

        fn columns() -> &'static [ColumnDef] {
            const COLS: &[ColumnDef] = &[
                ColumnDef {
                    field: "id",
                    column: "Id",
                    primary_key: true,
                    auto_increment: true,
                },
                ColumnDef::new("Name"),
            ];
            COLS
        }

        fn values(&self) -> Vec<SqlValue> {
            vec![self.id.to_sql_value(), self.name.to_sql_value()]
        }
    }

    fn people(names: &[&str]) -> Vec<Person> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Person {
                id: i as i64 + 1,
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn insert_excludes_generated_key_and_escapes_values() {
        let rows = people(&["O'Brien", "Lee"]);
        let stmts = insert_statements(&rows, DEFAULT_CHUNK).unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0],
            "INSERT INTO Person (Name) VALUES ('O''Brien'),('Lee')"
        );
    }

    #[test]
    fn insert_chunks_by_ceiling_division() {
        let rows = people(&["a", "b", "c", "d", "e"]);
        let stmts = insert_statements(&rows, 2).unwrap();
        assert_eq!(stmts.len(), 3);
        assert!(stmts[2].ends_with("VALUES ('e')"));
    }

    #[test]
    fn insert_empty_rows_yields_no_statements() {
        let stmts = insert_statements::<Person>(&[], DEFAULT_CHUNK).unwrap();
        assert!(stmts.is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let rows = people(&["a"]);
        assert!(insert_statements(&rows, 0).is_err());
        assert!(update_statements(&rows, 0).is_err());
    }

    #[test]
    fn update_joins_derived_table_on_primary_key() {
        let rows = people(&["Lee"]);
        let stmts = update_statements(&rows, DEFAULT_CHUNK).unwrap();
        assert_eq!(
            stmts[0],
            "UPDATE Person a INNER JOIN ( SELECT 1 AS Id,'Lee' AS Name ) b \
             ON a.Id=b.Id SET a.Name=b.Name"
        );
    }

    #[test]
    fn update_unions_multiple_rows() {
        let rows = people(&["a", "b"]);
        let stmts = update_statements(&rows, DEFAULT_CHUNK).unwrap();
        assert!(stmts[0].contains("SELECT 1 AS Id,'a' AS Name UNION ALL SELECT 2 AS Id,'b' AS Name"));
    }

    struct NoKey {
        v: i64,
    }

    impl Table for NoKey {
        const TABLE: &'static str = "NoKey";

        fn columns() -> &'static [ColumnDef] {
            const COLS: &[ColumnDef] = &[ColumnDef::new("v")];
            COLS
        }

        fn values(&self) -> Vec<SqlValue> {
            vec![self.v.to_sql_value()]
        }
    }

    #[test]
    fn update_without_primary_key_fails() {
        let err = update_statements(&[NoKey { v: 1 }], DEFAULT_CHUNK).unwrap_err();
        assert!(err.is_metadata());
    }

    #[test]
    fn null_values_render_as_null_keyword() {
        struct Row {
            id: i64,
            note: Option<String>,
        }
        impl Table for Row {
            const TABLE: &'static str = "Row";

            fn columns() -> &'static [ColumnDef] {
                const COLS: &[ColumnDef] = &[
                    ColumnDef {
                        field: "id",
                        column: "id",
                        primary_key: true,
                        auto_increment: false,
                    },
                    ColumnDef::new("note"),
                ];
                COLS
            }

            fn values(&self) -> Vec<SqlValue> {
                vec![self.id.to_sql_value(), self.note.to_sql_value()]
            }
        }

        let rows = [Row { id: 1, note: None }];
        let stmts = insert_statements(&rows, DEFAULT_CHUNK).unwrap();
        // Non-generated key participates in the tuple.
        assert_eq!(stmts[0], "INSERT INTO Row (id,note) VALUES (1,NULL)");
        let stmts = update_statements(&rows, DEFAULT_CHUNK).unwrap();
        assert!(stmts[0].contains("NULL AS note"));
    }
}
