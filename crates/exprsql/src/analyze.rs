//! Predicate analysis.
//!
//! [`analyze`] walks a predicate [`Expr`] tree and produces an [`Analysis`]:
//! the ordered SQL fragment stream, the table map discovered while walking
//! member chains, and the parameter echo map. All three are created fresh for
//! a single call and never escape the calling stack, so concurrent compiles
//! never interact.
//!
//! The token stream keeps string literals as a distinct token kind carrying
//! the unquoted value. `LIKE` wildcard wrapping is therefore a value
//! transform on the last emitted token; quoting and escaping happen once, at
//! render time.

use crate::error::{SqlError, SqlResult};
use crate::expr::{CallKind, CmpOp, Expr};
use crate::schema::TableMeta;
use crate::value::{SqlValue, escape_str};
use serde::Serialize;
use std::collections::BTreeMap;

/// Alias given to the filtered table when the caller does not choose one.
pub const DEFAULT_ALIAS: &str = "t";

/// Caller-supplied named argument values, consulted for value-side member
/// references.
pub type ArgMap = BTreeMap<String, SqlValue>;

/// Echo of the values a compile resolved, keyed `"@" + field`.
///
/// Recorded for diagnostics and optional reuse; the emitted SQL always
/// carries the values as literals, never as bound parameters.
pub type ParamMap = BTreeMap<String, SqlValue>;

/// One emitted SQL fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    /// Opaque SQL text, rendered as-is
    Frag(String),
    /// A string literal carrying its unquoted value; quoted and escaped when
    /// rendered
    Str(String),
}

impl Token {
    fn render(&self) -> String {
        match self {
            Token::Frag(s) => s.clone(),
            Token::Str(s) => format!("'{}'", escape_str(s)),
        }
    }
}

/// Ordered fragment stream; concatenating the rendered tokens with single
/// spaces yields the WHERE clause body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    fn push_frag(&mut self, s: impl Into<String>) {
        self.tokens.push(Token::Frag(s.into()));
    }

    fn push_text(&mut self, s: impl Into<String>) {
        self.tokens.push(Token::Str(s.into()));
    }

    fn replace_last(&mut self, token: Token) {
        if let Some(last) = self.tokens.last_mut() {
            *last = token;
        }
    }

    /// The emitted tokens, in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Render the stream, joining fragments with single spaces.
    pub fn render(&self) -> String {
        let parts: Vec<String> = self.tokens.iter().map(Token::render).collect();
        parts.join(" ")
    }
}

/// A table discovered while walking member chains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableEntry {
    /// Display name of the table
    pub table: String,
    /// Whether this entry is the filtered record's own table. Exactly one
    /// entry per analysis carries this flag.
    pub is_main: bool,
}

/// Alias → table facts discovered during analysis.
pub type TableMap = BTreeMap<String, TableEntry>;

/// The complete result of analyzing one predicate tree.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub tokens: TokenStream,
    pub tables: TableMap,
    pub params: ParamMap,
}

/// Analyze a predicate over a record type described by `meta`.
///
/// `alias` names the filtered table in emitted column references; `args`
/// supplies values for member references appearing on the value side of a
/// comparison.
pub fn analyze(
    expr: &Expr,
    meta: &TableMeta,
    alias: &str,
    args: &ArgMap,
) -> SqlResult<Analysis> {
    let mut walker = Walker {
        meta,
        alias,
        args,
        tokens: TokenStream::default(),
        tables: TableMap::new(),
        params: ParamMap::new(),
    };
    // The filtered table itself is always present, even for predicates that
    // never touch a member.
    walker.tables.insert(
        alias.to_string(),
        TableEntry {
            table: meta.table().to_string(),
            is_main: true,
        },
    );
    walker.walk_bool(expr)?;

    let analysis = Analysis {
        tokens: walker.tokens,
        tables: walker.tables,
        params: walker.params,
    };
    tracing::debug!(
        analysis = %serde_json::to_string(&analysis).unwrap_or_default(),
        "analyzed predicate"
    );
    Ok(analysis)
}

struct Walker<'a> {
    meta: &'a TableMeta,
    alias: &'a str,
    args: &'a ArgMap,
    tokens: TokenStream,
    tables: TableMap,
    params: ParamMap,
}

/// Strip `Convert`/`Not` wrappers; they are transparent to operand roles.
fn unwrap_transparent(mut expr: &Expr) -> &Expr {
    loop {
        match expr {
            Expr::Convert(inner) | Expr::Not(inner) => expr = inner,
            other => return other,
        }
    }
}

impl Walker<'_> {
    fn walk_bool(&mut self, expr: &Expr) -> SqlResult<()> {
        match expr {
            Expr::And(l, r) | Expr::Or(l, r) => {
                let joiner = if matches!(expr, Expr::And(..)) { "AND" } else { "OR" };
                // Parenthesization is unconditional so precedence never
                // depends on SQL's own rules.
                self.tokens.push_frag("(");
                self.walk_bool(l)?;
                self.tokens.push_frag(")");
                self.tokens.push_frag(joiner);
                self.tokens.push_frag("(");
                self.walk_bool(r)?;
                self.tokens.push_frag(")");
                Ok(())
            }
            Expr::Not(inner) | Expr::Convert(inner) => self.walk_bool(inner),
            Expr::Compare { op, left, right } => self.walk_compare(*op, left, right),
            Expr::Call {
                kind,
                receiver,
                args,
            } => self.walk_call(*kind, receiver, args),
            Expr::Member { owner, name } => {
                // A bare boolean column reference.
                let col = self.column_ref(owner.as_deref(), name)?;
                self.tokens.push_frag(col);
                Ok(())
            }
            Expr::Value(_) => Err(SqlError::unsupported("Value", "boolean")),
        }
    }

    fn walk_compare(&mut self, op: CmpOp, left: &Expr, right: &Expr) -> SqlResult<()> {
        let left = unwrap_transparent(left);
        let right = unwrap_transparent(right);

        let (column_side, value_side, op) = match (left, right) {
            (Expr::Member { .. }, _) => (left, right, op),
            (_, Expr::Member { .. }) => (right, left, op.mirrored()),
            _ => {
                return Err(SqlError::MalformedComparison { op: op.symbol() });
            }
        };

        let Expr::Member { owner, name } = column_side else {
            unreachable!("column side checked above");
        };
        let col = self.column_ref(owner.as_deref(), name)?;
        self.tokens.push_frag(col);
        self.tokens.push_frag(op.symbol());

        let value = self.resolve_value(value_side)?;
        if value.is_null() {
            // Retroactively rewrite the operator just emitted; no value token
            // follows.
            let rewritten = if op == CmpOp::Eq { "IS NULL" } else { "IS NOT NULL" };
            self.tokens.replace_last(Token::Frag(rewritten.to_string()));
        } else {
            self.emit_value(value);
        }
        Ok(())
    }

    fn walk_call(&mut self, kind: CallKind, receiver: &Expr, args: &[Expr]) -> SqlResult<()> {
        let receiver = unwrap_transparent(receiver);
        let Expr::Member { owner, name } = receiver else {
            return Err(SqlError::unsupported(receiver.kind_name(), "call receiver"));
        };
        let col = self.column_ref(owner.as_deref(), name)?;

        match kind {
            CallKind::NotEmpty | CallKind::NotBlank => {
                self.tokens
                    .push_frag(format!("{col} is not null and {col} <>''"));
                Ok(())
            }
            CallKind::StartsWith | CallKind::EndsWith | CallKind::Contains => {
                let [pattern] = args else {
                    return Err(SqlError::validation(
                        "LIKE call takes exactly one pattern argument",
                    ));
                };
                self.tokens.push_frag(col);
                self.tokens.push_frag("LIKE");
                let value = self.resolve_value(unwrap_transparent(pattern))?;
                let Some(text) = value.as_text() else {
                    return Err(SqlError::validation(
                        "LIKE pattern must be a string value",
                    ));
                };
                // Wildcards wrap the unquoted value; escaping happens at
                // render time.
                let wrapped = match kind {
                    CallKind::StartsWith => format!("{text}%"),
                    CallKind::EndsWith => format!("%{text}"),
                    _ => format!("%{text}%"),
                };
                self.tokens.push_text(wrapped);
                Ok(())
            }
            CallKind::InList => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.resolve_value(unwrap_transparent(arg))?;
                    rendered.push(value.render());
                }
                if rendered.is_empty() {
                    return Err(SqlError::TranslationAmbiguity { column: col });
                }
                self.tokens
                    .push_frag(format!("{col} in ( {} )", rendered.join(",")));
                Ok(())
            }
        }
    }

    /// Resolve a value-side expression to a concrete runtime value.
    ///
    /// Member references name entries of the caller's argument map and are
    /// echoed into the parameter map under `"@" + field`.
    fn resolve_value(&mut self, expr: &Expr) -> SqlResult<SqlValue> {
        match expr {
            Expr::Value(v) => Ok(v.clone()),
            Expr::Member { name, .. } => {
                let value = self.args.get(name).cloned().ok_or_else(|| {
                    SqlError::validation(format!(
                        "no argument named '{name}' supplied for value-side member reference"
                    ))
                })?;
                self.params.insert(format!("@{name}"), value.clone());
                Ok(value)
            }
            other => Err(SqlError::unsupported(other.kind_name(), "value")),
        }
    }

    fn emit_value(&mut self, value: SqlValue) {
        match value {
            SqlValue::Text(s) => self.tokens.push_text(s),
            other => self.tokens.push_frag(other.render()),
        }
    }

    /// Resolve a member reference to its bracketed alias-qualified form and
    /// record the owning table.
    fn column_ref(&mut self, owner: Option<&str>, name: &str) -> SqlResult<String> {
        match owner {
            None => {
                let column = self.meta.sql_column(name)?;
                Ok(format!("[{}].{}", self.alias, column))
            }
            Some(owner) => {
                // Nested chain: secondary table keyed by the chain's owner.
                // No metadata is available for the foreign type, so the
                // member name passes through unresolved.
                self.tables.entry(owner.to_string()).or_insert(TableEntry {
                    table: owner.to_string(),
                    is_main: false,
                });
                Ok(format!("[{owner}].{name}"))
            }
        }
    }
}
