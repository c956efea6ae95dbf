//! Query layer building blocks.
//!
//! # Responsibility
//! - Composable predicates and mutations over typed entity fields.
//! - Sort keys, page requests, and the `Page`/`Slice` result windows.
//! - Translation of the above into parameterized SQL fragments.
//!
//! # Invariants
//! - Nothing in this module touches stored data.
//! - Structural misuse (bad page size, null filter value, wrong value kind)
//!   is reported as `QueryError`; "no rows" is never an error.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

mod mutation;
mod page;
mod predicate;
pub(crate) mod sql;

pub use mutation::{Assignment, Mutation};
pub use page::{Direction, Order, Page, PageRequest, Slice, Sort};
pub use predicate::Predicate;

pub type QueryResult<T> = Result<T, QueryError>;

/// Storage kind of a field, used to validate bound values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// A queryable column of one entity.
pub trait Field: Copy + Eq + Debug + 'static {
    /// Every field, in declaration order.
    const ALL: &'static [Self];
    /// The identity field used as the final sort tie-breaker.
    const IDENTITY: Self;

    /// External name, as used in sort parameters.
    fn name(self) -> &'static str;
    /// Qualified SQL expression used in `WHERE`/`ORDER BY`.
    fn column(self) -> &'static str;
    /// Bare column name for `UPDATE ... SET`; `None` when read-only.
    fn writable_column(self) -> Option<&'static str>;
    fn kind(self) -> FieldKind;

    /// Whether the column accepts `NULL` writes.
    fn nullable(self) -> bool {
        false
    }

    /// Inclusive bounds for integer values stored in the column.
    fn bounds(self) -> Option<(i64, i64)> {
        None
    }

    /// Resolves an external name, ignoring ASCII case.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }
}

/// A value bound against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    /// Only meaningful to reject; use `Predicate::is_null` to test for null.
    Null,
}

impl Value {
    fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Integer(_) => Some(FieldKind::Integer),
            Self::Text(_) => Some(FieldKind::Text),
            Self::Null => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Rejected-argument conditions raised at the query boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidPageIndex(i64),
    PageIndexTooLarge { page: i64, max: u32 },
    InvalidPageSize(i64),
    PageSizeTooLarge { size: i64, max: u32 },
    InvalidSortDirection(String),
    MalformedSort(String),
    UnknownField(String),
    NullValue { field: &'static str },
    TypeMismatch { field: &'static str, expected: FieldKind },
    NotWritable { field: &'static str },
    OutOfRange { field: &'static str, value: i64 },
    /// Applying the increment would push a matching row out of the column bounds.
    IncrementOverflow { field: &'static str, delta: i64 },
    InvalidParameter { name: String, value: String },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageIndex(page) => {
                write!(f, "page index must not be negative, got {page}")
            }
            Self::PageIndexTooLarge { page, max } => {
                write!(f, "page index {page} exceeds the maximum of {max}")
            }
            Self::InvalidPageSize(size) => write!(f, "page size must be positive, got {size}"),
            Self::PageSizeTooLarge { size, max } => {
                write!(f, "page size {size} exceeds the maximum of {max}")
            }
            Self::InvalidSortDirection(value) => {
                write!(f, "invalid sort direction `{value}`; expected ASC|DESC")
            }
            Self::MalformedSort(value) => {
                write!(f, "malformed sort `{value}`; expected `field[,direction]`")
            }
            Self::UnknownField(name) => write!(f, "unknown field `{name}`"),
            Self::NullValue { field } => write!(f, "null value is not allowed for `{field}`"),
            Self::TypeMismatch { field, expected } => {
                write!(f, "field `{field}` expects a {expected} value")
            }
            Self::NotWritable { field } => write!(f, "field `{field}` cannot be updated"),
            Self::OutOfRange { field, value } => {
                write!(f, "value {value} is out of range for `{field}`")
            }
            Self::IncrementOverflow { field, delta } => {
                write!(f, "adding {delta} would overflow `{field}` for a matching row")
            }
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid value `{value}` for parameter `{name}`")
            }
        }
    }
}

impl Error for QueryError {}

/// Checks that `value` is non-null and matches the field kind.
pub(crate) fn check_value<F: Field>(field: F, value: &Value) -> QueryResult<()> {
    match value.kind() {
        None => Err(QueryError::NullValue {
            field: field.name(),
        }),
        Some(kind) if kind != field.kind() => Err(QueryError::TypeMismatch {
            field: field.name(),
            expected: field.kind(),
        }),
        Some(_) => Ok(()),
    }
}

/// Checks an integer value against the field's column bounds.
pub(crate) fn check_bounds<F: Field>(field: F, value: &Value) -> QueryResult<()> {
    match (field.bounds(), value) {
        (Some((min, max)), Value::Integer(number)) if !(min..=max).contains(number) => {
            Err(QueryError::OutOfRange {
                field: field.name(),
                value: *number,
            })
        }
        _ => Ok(()),
    }
}
