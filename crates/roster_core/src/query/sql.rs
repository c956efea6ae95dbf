//! SQL rendering for predicates, sort keys, and mutations.
//!
//! All values travel as bound parameters (`?`); only field column names,
//! which come from `Field` implementations, are spliced into the text.

use super::{Assignment, Field, Mutation, Predicate, QueryResult, Sort, Value};
use rusqlite::types::Value as SqlValue;

/// SQL text plus its positional parameters, in order.
#[derive(Debug, Default)]
pub(crate) struct SqlFragment {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Renders a validated `WHERE` condition (without the keyword).
pub(crate) fn where_clause<F: Field>(predicate: &Predicate<F>) -> QueryResult<SqlFragment> {
    predicate.validate()?;
    let mut fragment = SqlFragment::default();
    render_predicate(predicate, &mut fragment);
    Ok(fragment)
}

/// Renders an `ORDER BY` list; identity ascending is always the last key.
pub(crate) fn order_by_clause<F: Field>(sort: &Sort<F>) -> String {
    let mut keys: Vec<String> = sort
        .orders()
        .iter()
        .map(|order| format!("{} {}", order.field.column(), order.direction.sql()))
        .collect();

    let sorts_by_identity = sort.orders().iter().any(|order| order.field == F::IDENTITY);
    if !sorts_by_identity {
        keys.push(format!("{} ASC", F::IDENTITY.column()));
    }
    keys.join(", ")
}

/// Renders a validated `SET` list (without the keyword).
pub(crate) fn set_clause<F: Field>(mutation: &Mutation<F>) -> QueryResult<SqlFragment> {
    mutation.validate()?;
    let mut fragment = SqlFragment::default();
    let mut parts = Vec::with_capacity(mutation.assignments().len());

    for assignment in mutation.assignments() {
        let column = assignment.field().writable_column().unwrap_or_default();
        match assignment {
            Assignment::Set(_, value) => {
                parts.push(format!("{column} = ?"));
                fragment.params.push(to_sql_value(value));
            }
            Assignment::Increment(_, delta) => {
                parts.push(format!("{column} = {column} + ?"));
                fragment.params.push(SqlValue::Integer(*delta));
            }
            Assignment::Clear(_) => parts.push(format!("{column} = NULL")),
        }
    }

    fragment.sql = parts.join(", ");
    Ok(fragment)
}

/// Condition matching rows that `column + delta` would push out of the
/// field's bounds; `None` for unbounded fields.
pub(crate) fn increment_overflow_clause<F: Field>(field: F, delta: i64) -> Option<SqlFragment> {
    let (min, max) = field.bounds()?;
    Some(SqlFragment {
        sql: format!("{} + ? NOT BETWEEN ? AND ?", field.column()),
        params: vec![
            SqlValue::Integer(delta),
            SqlValue::Integer(min),
            SqlValue::Integer(max),
        ],
    })
}

fn render_predicate<F: Field>(predicate: &Predicate<F>, out: &mut SqlFragment) {
    match predicate {
        Predicate::All => out.sql.push_str("1 = 1"),
        Predicate::Equals(field, value) => render_comparison(*field, "=", value, out),
        Predicate::GreaterThan(field, value) => render_comparison(*field, ">", value, out),
        Predicate::GreaterThanOrEqual(field, value) => render_comparison(*field, ">=", value, out),
        Predicate::LessThan(field, value) => render_comparison(*field, "<", value, out),
        Predicate::In(_, values) if values.is_empty() => out.sql.push_str("1 = 0"),
        Predicate::In(field, values) => {
            let placeholders = vec!["?"; values.len()].join(", ");
            out.sql.push_str(&format!("{} IN ({placeholders})", field.column()));
            out.params.extend(values.iter().map(to_sql_value));
        }
        Predicate::IsNull(field) => out.sql.push_str(&format!("{} IS NULL", field.column())),
        Predicate::And(items) => render_group(items, " AND ", "1 = 1", out),
        Predicate::Or(items) => render_group(items, " OR ", "1 = 0", out),
    }
}

fn render_comparison<F: Field>(field: F, operator: &str, value: &Value, out: &mut SqlFragment) {
    out.sql.push_str(&format!("{} {operator} ?", field.column()));
    out.params.push(to_sql_value(value));
}

fn render_group<F: Field>(
    items: &[Predicate<F>],
    joiner: &str,
    empty: &str,
    out: &mut SqlFragment,
) {
    if items.is_empty() {
        out.sql.push_str(empty);
        return;
    }

    out.sql.push('(');
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.sql.push_str(joiner);
        }
        render_predicate(item, out);
    }
    out.sql.push(')');
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Integer(number) => SqlValue::Integer(*number),
        Value::Text(text) => SqlValue::Text(text.clone()),
        Value::Null => SqlValue::Null,
    }
}
