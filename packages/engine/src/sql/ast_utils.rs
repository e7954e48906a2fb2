use sqlparser::ast::{
    BinaryOperator, Expr, Ident, ObjectName, ObjectNamePart, Value as SqlValue,
};

use crate::Value;

pub(crate) fn object_name_matches(name: &ObjectName, target: &str) -> bool {
    last_name_part(name)
        .map(|part| part.eq_ignore_ascii_case(target))
        .unwrap_or(false)
}

pub(crate) fn last_name_part(name: &ObjectName) -> Option<&str> {
    name.0
        .last()
        .and_then(ObjectNamePart::as_ident)
        .map(|ident| ident.value.as_str())
}

pub fn column_expr(qualifier: Option<&str>, column: &str) -> Expr {
    match qualifier {
        Some(qualifier) => Expr::CompoundIdentifier(vec![Ident::new(qualifier), Ident::new(column)]),
        None => Expr::Identifier(Ident::new(column)),
    }
}

pub fn value_expr(value: &Value) -> Expr {
    let value = match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(flag) => SqlValue::Boolean(*flag),
        Value::Integer(value) => SqlValue::Number(value.to_string(), false),
        Value::Real(value) => SqlValue::Number(value.to_string(), false),
        Value::Text(value) => SqlValue::SingleQuotedString(value.clone()),
    };
    Expr::Value(value.into())
}

/// `column = value`, or `column IS NULL` for a null value.
pub fn equals_predicate(column: Expr, value: &Value) -> Expr {
    if value.is_null() {
        return Expr::IsNull(Box::new(column));
    }
    Expr::BinaryOp {
        left: Box::new(column),
        op: BinaryOperator::Eq,
        right: Box::new(value_expr(value)),
    }
}

/// ANDs `predicate` onto `selection`. Disjunctions on either side are
/// parenthesised so the conjunction binds to the whole existing predicate.
pub fn and_predicate(selection: Option<Expr>, predicate: Expr) -> Expr {
    let predicate = parenthesize_disjunction(predicate);
    match selection {
        Some(existing) => Expr::BinaryOp {
            left: Box::new(parenthesize_disjunction(existing)),
            op: BinaryOperator::And,
            right: Box::new(predicate),
        },
        None => predicate,
    }
}

pub(crate) fn append_selection(selection: &mut Option<Expr>, predicate: Expr) {
    *selection = Some(and_predicate(selection.take(), predicate));
}

pub(crate) fn join_conjunction(predicates: Vec<Expr>) -> Option<Expr> {
    predicates
        .into_iter()
        .fold(None, |current, predicate| Some(and_predicate(current, predicate)))
}

fn parenthesize_disjunction(expr: Expr) -> Expr {
    match expr {
        Expr::BinaryOp {
            op: BinaryOperator::Or | BinaryOperator::Xor,
            ..
        } => Expr::Nested(Box::new(expr)),
        other => other,
    }
}
