//! Predicate combinators.
//!
//! Callers compose conditions in code (`eq(...).and(gt(...))`); the record
//! store compiles the tree into a parameterized `WHERE` clause.

use super::{check_value, Field, QueryResult, Value};

/// Composable condition over fields of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<F: Field> {
    /// Matches every record.
    All,
    Equals(F, Value),
    GreaterThan(F, Value),
    GreaterThanOrEqual(F, Value),
    LessThan(F, Value),
    /// Membership in a list; an empty list matches nothing.
    In(F, Vec<Value>),
    IsNull(F),
    And(Vec<Predicate<F>>),
    Or(Vec<Predicate<F>>),
}

impl<F: Field> Predicate<F> {
    pub fn all() -> Self {
        Self::All
    }

    pub fn eq(field: F, value: impl Into<Value>) -> Self {
        Self::Equals(field, value.into())
    }

    pub fn gt(field: F, value: impl Into<Value>) -> Self {
        Self::GreaterThan(field, value.into())
    }

    pub fn ge(field: F, value: impl Into<Value>) -> Self {
        Self::GreaterThanOrEqual(field, value.into())
    }

    pub fn lt(field: F, value: impl Into<Value>) -> Self {
        Self::LessThan(field, value.into())
    }

    pub fn is_in<V: Into<Value>>(field: F, values: impl IntoIterator<Item = V>) -> Self {
        Self::In(field, values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(field: F) -> Self {
        Self::IsNull(field)
    }

    /// Conjunction; nested `And`s are flattened.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, other) | (other, Self::All) => other,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (this, Self::And(mut right)) => {
                right.insert(0, this);
                Self::And(right)
            }
            (this, other) => Self::And(vec![this, other]),
        }
    }

    /// Disjunction; nested `Or`s are flattened.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => Self::All,
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (this, other) => Self::Or(vec![this, other]),
        }
    }

    /// Rejects null values and values of the wrong kind anywhere in the tree.
    pub fn validate(&self) -> QueryResult<()> {
        match self {
            Self::All | Self::IsNull(_) => Ok(()),
            Self::Equals(field, value)
            | Self::GreaterThan(field, value)
            | Self::GreaterThanOrEqual(field, value)
            | Self::LessThan(field, value) => check_value(*field, value),
            Self::In(field, values) => values
                .iter()
                .try_for_each(|value| check_value(*field, value)),
            Self::And(items) | Self::Or(items) => items.iter().try_for_each(Self::validate),
        }
    }
}
