//! Column assignments applied by bulk updates.

use super::{check_bounds, check_value, Field, FieldKind, QueryError, QueryResult, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment<F: Field> {
    /// `column = value`
    Set(F, Value),
    /// `column = column + delta`; integer fields only.
    Increment(F, i64),
    /// `column = NULL`
    Clear(F),
}

impl<F: Field> Assignment<F> {
    pub fn field(&self) -> F {
        match self {
            Self::Set(field, _) | Self::Increment(field, _) | Self::Clear(field) => *field,
        }
    }
}

/// Ordered set of assignments executed as one `UPDATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<F: Field> {
    assignments: Vec<Assignment<F>>,
}

impl<F: Field> Mutation<F> {
    pub fn set(field: F, value: impl Into<Value>) -> Self {
        Self {
            assignments: vec![Assignment::Set(field, value.into())],
        }
    }

    pub fn increment(field: F, delta: i64) -> Self {
        Self {
            assignments: vec![Assignment::Increment(field, delta)],
        }
    }

    pub fn clear(field: F) -> Self {
        Self {
            assignments: vec![Assignment::Clear(field)],
        }
    }

    /// Appends another assignment.
    pub fn then(mut self, assignment: Assignment<F>) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn assignments(&self) -> &[Assignment<F>] {
        &self.assignments
    }

    pub fn validate(&self) -> QueryResult<()> {
        for assignment in &self.assignments {
            let field = assignment.field();
            if field.writable_column().is_none() {
                return Err(QueryError::NotWritable {
                    field: field.name(),
                });
            }
            match assignment {
                Assignment::Set(_, value) => {
                    check_value(field, value)?;
                    check_bounds(field, value)?;
                }
                Assignment::Increment(_, _) if field.kind() != FieldKind::Integer => {
                    return Err(QueryError::TypeMismatch {
                        field: field.name(),
                        expected: FieldKind::Integer,
                    });
                }
                Assignment::Clear(_) if !field.nullable() => {
                    return Err(QueryError::NullValue {
                        field: field.name(),
                    });
                }
                Assignment::Increment(_, _) | Assignment::Clear(_) => {}
            }
        }
        Ok(())
    }
}
