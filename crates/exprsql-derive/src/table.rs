//! Table derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::sql_ident::{parse_sql_ident, parse_sql_ident_with_span};

/// Parsed `#[sql(...)]` field attributes.
struct FieldAttr {
    column: Option<String>,
    primary_key: bool,
    auto_increment: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let table_name = get_table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Table can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Table can only be derived for structs",
            ));
        }
    };
    if fields.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Table requires at least one field",
        ));
    }

    let mut column_defs = Vec::with_capacity(fields.len());
    let mut value_exprs = Vec::with_capacity(fields.len());

    for field in fields.iter() {
        let field_ident = field.ident.clone().unwrap();
        let field_name = field_ident.to_string();
        let attr = get_field_attr(field)?;
        let column = match attr.column {
            Some(c) => c,
            None => {
                parse_sql_ident_with_span(&field_name, field_ident.span(), "field name")?
            }
        };
        let primary_key = attr.primary_key;
        let auto_increment = attr.auto_increment;

        column_defs.push(quote! {
            ::exprsql::ColumnDef {
                field: #field_name,
                column: #column,
                primary_key: #primary_key,
                auto_increment: #auto_increment,
            }
        });
        value_exprs.push(quote! {
            ::exprsql::ToSqlValue::to_sql_value(&self.#field_ident)
        });
    }

    Ok(quote! {
        impl ::exprsql::Table for #name {
            const TABLE: &'static str = #table_name;

            fn columns() -> &'static [::exprsql::ColumnDef] {
                const COLS: &[::exprsql::ColumnDef] = &[#(#column_defs),*];
                COLS
            }

            fn values(&self) -> ::std::vec::Vec<::exprsql::SqlValue> {
                ::std::vec![#(#value_exprs),*]
            }
        }
    })
}

/// Table name from `#[sql(table = "...")]`, defaulting to the struct name.
fn get_table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("sql") {
            if let Ok(nested) = attr.parse_args::<syn::MetaNameValue>() {
                if nested.path.is_ident("table") {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) = &nested.value
                    {
                        return parse_sql_ident(lit, "table name");
                    }
                }
            }
        }
    }
    Ok(input.ident.to_string())
}

fn get_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut parsed = FieldAttr {
        column: None,
        primary_key: false,
        auto_increment: false,
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }
        if let syn::Meta::List(meta_list) = &attr.meta {
            let items = syn::parse2::<AttrItems>(meta_list.tokens.clone())?;
            if let Some(column) = items.column {
                parsed.column = Some(column);
            }
            parsed.primary_key |= items.primary_key;
            parsed.auto_increment |= items.auto_increment;
        }
    }

    Ok(parsed)
}

/// Comma-separated list of `primary_key`, `auto_increment`, and
/// `column = "..."` items.
struct AttrItems {
    column: Option<String>,
    primary_key: bool,
    auto_increment: bool,
}

impl syn::parse::Parse for AttrItems {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut column = None;
        let mut primary_key = false;
        let mut auto_increment = false;

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            if ident == "primary_key" {
                primary_key = true;
            } else if ident == "auto_increment" {
                auto_increment = true;
            } else if ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                column = Some(parse_sql_ident(&value, "column name")?);
            } else if ident == "table" {
                return Err(syn::Error::new(
                    ident.span(),
                    "table = \"...\" belongs on the struct, not a field",
                ));
            } else {
                return Err(syn::Error::new(
                    ident.span(),
                    "expected primary_key, auto_increment, or column = \"...\"",
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(AttrItems {
            column,
            primary_key,
            auto_increment,
        })
    }
}
