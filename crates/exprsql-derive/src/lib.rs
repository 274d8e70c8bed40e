//! Derive macros for exprsql
//!
//! Provides the `#[derive(Table)]` macro.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod sql_ident;
mod table;

/// Derive the `Table` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use exprsql::Table;
///
/// #[derive(Table)]
/// #[sql(table = "Person")]
/// struct Person {
///     #[sql(primary_key, auto_increment)]
///     id: i64,
///     #[sql(column = "FullName")]
///     name: String,
///     age: i32,
/// }
/// ```
///
/// # Attributes
///
/// - `#[sql(table = "name")]` - Table name (defaults to the struct name)
/// - `#[sql(column = "name")]` - Map field to a different column name
/// - `#[sql(primary_key)]` - Mark field as part of the primary key
/// - `#[sql(auto_increment)]` - Mark field as database-generated
#[proc_macro_derive(Table, attributes(sql))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    table::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
