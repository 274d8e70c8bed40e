//! SELECT statement assembly.
//!
//! Combines an [`Analysis`] with table metadata and a target [`Dialect`] into
//! a complete statement, applying the dialect's row-limiting syntax and
//! collapsing the bracketed main-table alias to its bare form.

use crate::analyze::Analysis;
use crate::schema::TableMeta;

/// Database family, as declared by the active connection's provider.
///
/// Only the row-limiting clause differs between the two supported families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `SELECT TOP n ...`
    SqlServer,
    /// `SELECT ... LIMIT n`
    MySql,
}

/// Assemble a complete `SELECT * FROM table alias WHERE ...` statement.
///
/// `limit = 0` means unlimited. Fragments are joined with single spaces; the
/// bracketed `[alias]` form produced by the analyzer is collapsed to the bare
/// alias for the main table only, leaving foreign chain references bracketed.
pub fn build_select(
    meta: &TableMeta,
    analysis: &Analysis,
    alias: &str,
    dialect: Dialect,
    limit: u64,
) -> String {
    let mut sql = String::from("SELECT ");
    if limit > 0 && dialect == Dialect::SqlServer {
        sql.push_str(&format!("TOP {limit} "));
    }
    sql.push_str(&format!("* FROM {} {alias} WHERE ", meta.table()));

    let bracketed = format!("[{alias}]");
    sql.push_str(&analysis.tokens.render().replace(&bracketed, alias));

    if limit > 0 && dialect == Dialect::MySql {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}
