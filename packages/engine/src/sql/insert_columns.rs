use sqlparser::ast::{
    Assignment, AssignmentTarget, Expr, Ident, Insert, ObjectName, ObjectNamePart, SelectItem,
    SetExpr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertColumnOutcome {
    Appended,
    AlreadyPresent,
    /// `INSERT INTO t VALUES (..)` without a column list: positions are unknown.
    NoColumnList,
    /// A source shape the column cannot be threaded through.
    Unsupported(&'static str),
}

pub fn insert_has_column(insert: &Insert, column: &str) -> bool {
    insert
        .columns
        .iter()
        .any(|existing| existing.value.eq_ignore_ascii_case(column))
        || insert.assignments.iter().any(|assignment| {
            matches!(
                &assignment.target,
                AssignmentTarget::ColumnName(name)
                    if super::ast_utils::object_name_matches(name, column)
            )
        })
}

/// Appends `column` with `value` to every row of the insert, keeping the
/// column list and each value row the same length.
pub fn append_insert_column(insert: &mut Insert, column: &str, value: Expr) -> InsertColumnOutcome {
    if insert_has_column(insert, column) {
        return InsertColumnOutcome::AlreadyPresent;
    }

    if !insert.assignments.is_empty() {
        insert.assignments.push(Assignment {
            target: AssignmentTarget::ColumnName(ObjectName(vec![ObjectNamePart::Identifier(
                Ident::new(column),
            )])),
            value,
        });
        return InsertColumnOutcome::Appended;
    }

    if insert.columns.is_empty() {
        return InsertColumnOutcome::NoColumnList;
    }

    let Some(source) = insert.source.as_mut() else {
        return InsertColumnOutcome::Unsupported("INSERT without a VALUES or SELECT source");
    };
    match source.body.as_mut() {
        SetExpr::Values(values) => {
            for row in &mut values.rows {
                row.push(value.clone());
            }
        }
        SetExpr::Select(select) => {
            select.projection.push(SelectItem::UnnamedExpr(value));
        }
        SetExpr::SetOperation { .. } => {
            return InsertColumnOutcome::Unsupported("INSERT from a set operation");
        }
        _ => return InsertColumnOutcome::Unsupported("INSERT source"),
    }

    insert.columns.push(Ident::new(column));
    InsertColumnOutcome::Appended
}

/// Rows of a VALUES source whose width differs from the column list.
pub(crate) fn mismatched_value_rows(insert: &Insert) -> Vec<(usize, usize)> {
    if insert.columns.is_empty() {
        return Vec::new();
    }
    let Some(source) = insert.source.as_ref() else {
        return Vec::new();
    };
    let SetExpr::Values(values) = source.body.as_ref() else {
        return Vec::new();
    };
    values
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.len() != insert.columns.len())
        .map(|(index, row)| (index, row.len()))
        .collect()
}
