//! Predicate expression trees.
//!
//! [`Expr`] is a closed tagged representation of a boolean filter over a
//! record's fields. It is built with the [`col`]/[`chain`]/[`lit`] helpers and
//! the combinator methods, then compiled by [`crate::analyze`]. Recognized
//! method calls are a fixed [`CallKind`] set resolved at construction time,
//! never re-matched by name during the walk.
//!
//! ```ignore
//! use exprsql::{col, lit};
//!
//! let filter = col("age").ge(18).and(col("name").starts_with("A"));
//! ```

use crate::value::SqlValue;

/// Comparison operator of a [`Expr::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CmpOp {
    /// The literal operator symbol emitted into the token stream.
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
        }
    }

    /// The operator with its operands exchanged: `a < b` ⇔ `b > a`.
    pub fn mirrored(&self) -> CmpOp {
        match self {
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Ne => CmpOp::Ne,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Ge => CmpOp::Le,
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Le => CmpOp::Ge,
        }
    }
}

/// The closed set of recognized method calls.
///
/// `NotEmpty`/`NotBlank` are named for the check they emit
/// (`is not null and <>''`), not for the host-language method the original
/// pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `<col> is not null and <col> <>''`
    NotEmpty,
    /// Same emission as `NotEmpty`; accepted for whitespace-blank checks
    NotBlank,
    /// `<col> LIKE 'value%'`
    StartsWith,
    /// `<col> LIKE '%value'`
    EndsWith,
    /// `<col> LIKE '%value%'`
    Contains,
    /// `<col> in ( v1,v2,... )` over an eagerly evaluated sequence
    InList,
}

/// A node of a predicate expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Both sides must hold
    And(Box<Expr>, Box<Expr>),
    /// Either side must hold
    Or(Box<Expr>, Box<Expr>),
    /// Negation; the walk recurses transparently into the operand
    Not(Box<Expr>),
    /// Type conversion wrapper; transparent to the walk
    Convert(Box<Expr>),
    /// Comparison between a column side and a value side
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Field reference. In column position this resolves to an
    /// alias-qualified column; in value position it names an entry of the
    /// caller's argument map.
    Member {
        /// Owner of a nested member chain; `None` for the filtered record's
        /// own fields
        owner: Option<String>,
        /// Field name
        name: String,
    },
    /// Compile-time constant
    Value(SqlValue),
    /// Recognized method call
    Call {
        kind: CallKind,
        receiver: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// Reference a field of the filtered record: `col("age")`.
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Member {
        owner: None,
        name: name.into(),
    }
}

/// Reference a field through a nested member chain: `chain("address", "city")`.
pub fn chain(owner: impl Into<String>, name: impl Into<String>) -> Expr {
    Expr::Member {
        owner: Some(owner.into()),
        name: name.into(),
    }
}

/// A constant literal: `lit(18)`, `lit("A")`, `lit(SqlValue::Null)`.
pub fn lit(value: impl Into<SqlValue>) -> Expr {
    Expr::Value(value.into())
}

impl From<SqlValue> for Expr {
    fn from(v: SqlValue) -> Self {
        Expr::Value(v)
    }
}

impl Expr {
    /// Combine with another predicate: both must hold.
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// Combine with another predicate: either must hold.
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Negate this predicate.
    pub fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    fn cmp(self, op: CmpOp, rhs: impl Into<Expr>) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into()),
        }
    }

    /// `self = rhs`
    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        self.cmp(CmpOp::Eq, rhs)
    }

    /// `self != rhs`
    pub fn ne(self, rhs: impl Into<Expr>) -> Expr {
        self.cmp(CmpOp::Ne, rhs)
    }

    /// `self > rhs`
    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        self.cmp(CmpOp::Gt, rhs)
    }

    /// `self >= rhs`
    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        self.cmp(CmpOp::Ge, rhs)
    }

    /// `self < rhs`
    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        self.cmp(CmpOp::Lt, rhs)
    }

    /// `self <= rhs`
    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        self.cmp(CmpOp::Le, rhs)
    }

    fn call(self, kind: CallKind, args: Vec<Expr>) -> Expr {
        Expr::Call {
            kind,
            receiver: Box::new(self),
            args,
        }
    }

    /// Column is neither NULL nor the empty string.
    pub fn is_not_empty(self) -> Expr {
        self.call(CallKind::NotEmpty, Vec::new())
    }

    /// Column is neither NULL nor blank. Emits the same check as
    /// [`Expr::is_not_empty`].
    pub fn is_not_blank(self) -> Expr {
        self.call(CallKind::NotBlank, Vec::new())
    }

    /// `column LIKE 'pattern%'`
    pub fn starts_with(self, pattern: impl Into<Expr>) -> Expr {
        self.call(CallKind::StartsWith, vec![pattern.into()])
    }

    /// `column LIKE '%pattern'`
    pub fn ends_with(self, pattern: impl Into<Expr>) -> Expr {
        self.call(CallKind::EndsWith, vec![pattern.into()])
    }

    /// `column LIKE '%pattern%'`
    pub fn contains(self, pattern: impl Into<Expr>) -> Expr {
        self.call(CallKind::Contains, vec![pattern.into()])
    }

    /// `column in ( values... )` over a compile-time sequence.
    ///
    /// The sequence is evaluated eagerly during analysis; an empty sequence
    /// fails the compile rather than emitting invalid `IN ()`.
    pub fn in_values<V>(self, values: impl IntoIterator<Item = V>) -> Expr
    where
        V: Into<SqlValue>,
    {
        let args = values
            .into_iter()
            .map(|v| Expr::Value(v.into()))
            .collect();
        self.call(CallKind::InList, args)
    }

    /// The node kind name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::And(..) => "And",
            Expr::Or(..) => "Or",
            Expr::Not(..) => "Not",
            Expr::Convert(..) => "Convert",
            Expr::Compare { .. } => "Compare",
            Expr::Member { .. } => "Member",
            Expr::Value(..) => "Value",
            Expr::Call { .. } => "Call",
        }
    }
}

macro_rules! expr_from_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Expr {
            fn from(v: $t) -> Self {
                Expr::Value(v.into())
            }
        })*
    };
}

expr_from_value!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    bool,
    &str,
    String,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    uuid::Uuid,
    serde_json::Value
);
