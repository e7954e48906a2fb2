use sqlparser::ast::{
    Delete, Expr, FromTable, Insert, JoinConstraint, JoinOperator, ObjectName, Select,
    TableFactor, TableObject, TableWithJoins, Update, UpdateTableFromKind,
};
use tracing::debug;

use super::ast_utils::{and_predicate, append_selection, column_expr, last_name_part};
use crate::errors::unsupported_construct_error;
use crate::RewriteError;

/// Names visible to a query block that are not base tables (CTEs).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryScope {
    ctes: Vec<String>,
}

impl QueryScope {
    pub(crate) fn with_ctes<'a, I>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ctes = self.ctes.clone();
        ctes.extend(names.into_iter().map(str::to_ascii_lowercase));
        Self { ctes }
    }

    pub fn is_cte(&self, name: &str) -> bool {
        self.ctes.iter().any(|cte| cte.eq_ignore_ascii_case(name))
    }
}

/// A base table referenced by a statement, with the qualifier its injected
/// columns must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub table: String,
    pub qualifier: Option<String>,
    /// The reference as written, for diagnostics.
    pub fragment: String,
}

impl TableTarget {
    pub fn column(&self, column: &str) -> Expr {
        column_expr(self.qualifier.as_deref(), column)
    }
}

/// Produces the predicate to inject for one table, given the predicate it
/// will be ANDed onto.
pub type PredicateFn<'a> =
    dyn FnMut(&TableTarget, Option<&Expr>) -> Result<Option<Expr>, RewriteError> + 'a;

pub fn scope_select(
    select: &mut Select,
    scope: &QueryScope,
    strict: bool,
    predicate_for: &mut PredicateFn<'_>,
) -> Result<(), RewriteError> {
    let Select {
        from, selection, ..
    } = select;
    scope_relations(from.iter_mut().collect(), selection, scope, strict, predicate_for)
}

/// Scopes the updated table and every relation of an `UPDATE .. FROM`.
pub fn scope_update(
    update: &mut Update,
    strict: bool,
    predicate_for: &mut PredicateFn<'_>,
) -> Result<(), RewriteError> {
    let Update {
        table,
        from,
        selection,
        ..
    } = update;
    let mut tables = vec![table];
    tables.extend(update_from_mut(from));
    scope_relations(
        tables,
        selection,
        &QueryScope::default(),
        strict,
        predicate_for,
    )
}

/// Scopes the deleted tables and every relation of a `DELETE .. USING`.
pub fn scope_delete(
    delete: &mut Delete,
    strict: bool,
    predicate_for: &mut PredicateFn<'_>,
) -> Result<(), RewriteError> {
    let Delete {
        from,
        using,
        selection,
        ..
    } = delete;
    let mut tables: Vec<&mut TableWithJoins> = match from {
        FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
            tables.iter_mut().collect()
        }
    };
    tables.extend(using.iter_mut().flatten());
    scope_relations(
        tables,
        selection,
        &QueryScope::default(),
        strict,
        predicate_for,
    )
}

pub fn insert_target(insert: &Insert) -> Option<TableTarget> {
    let TableObject::TableName(name) = &insert.table else {
        return None;
    };
    Some(TableTarget {
        table: last_name_part(name)?.to_string(),
        qualifier: None,
        fragment: name.to_string(),
    })
}

/// The table an `UPDATE` writes to, qualified by its alias when it has one.
/// The table an `UPDATE` writes to, qualified by its alias, or by its name
/// when the statement references more than one relation.
pub fn update_target(update: &Update) -> Option<TableTarget> {
    let relation = &update.table.relation;
    let TableFactor::Table { name, alias, .. } = relation else {
        return None;
    };
    let table = last_name_part(name)?.to_string();
    let from: &[TableWithJoins] = match &update.from {
        Some(UpdateTableFromKind::BeforeSet(from) | UpdateTableFromKind::AfterSet(from)) => {
            from.as_slice()
        }
        None => &[],
    };
    let relations =
        count_relations(&update.table) + from.iter().map(count_relations).sum::<usize>();
    let qualifier = match alias {
        Some(alias) => Some(alias.name.value.clone()),
        None if relations > 1 => Some(table.clone()),
        None => None,
    };
    Some(TableTarget {
        table,
        qualifier,
        fragment: relation.to_string(),
    })
}

fn update_from_mut(
    from: &mut Option<UpdateTableFromKind>,
) -> impl Iterator<Item = &mut TableWithJoins> {
    from.iter_mut().flat_map(|from| match from {
        UpdateTableFromKind::BeforeSet(tables) | UpdateTableFromKind::AfterSet(tables) => {
            tables.iter_mut()
        }
    })
}

fn scope_relations(
    tables: Vec<&mut TableWithJoins>,
    selection: &mut Option<Expr>,
    scope: &QueryScope,
    strict: bool,
    predicate_for: &mut PredicateFn<'_>,
) -> Result<(), RewriteError> {
    let qualify = tables.iter().map(|table| count_relations(table)).sum::<usize>() > 1;
    let mut walker = RelationWalker {
        scope,
        strict,
        qualify,
        predicate_for,
    };

    let mut where_predicates = Vec::new();
    for table in tables {
        walker.table_with_joins(table, selection.as_ref(), &mut where_predicates)?;
    }
    for predicate in where_predicates {
        append_selection(selection, predicate);
    }
    Ok(())
}

struct RelationWalker<'s, 'p, 'f> {
    scope: &'s QueryScope,
    strict: bool,
    qualify: bool,
    predicate_for: &'p mut PredicateFn<'f>,
}

impl RelationWalker<'_, '_, '_> {
    fn table_with_joins(
        &mut self,
        table: &mut TableWithJoins,
        existing: Option<&Expr>,
        out: &mut Vec<Expr>,
    ) -> Result<(), RewriteError> {
        self.factor(&mut table.relation, existing, out)?;

        for join in &mut table.joins {
            let (constraint, inner) = join_constraint_mut(&mut join.join_operator);
            match constraint {
                Some(JoinConstraint::On(on)) => {
                    let mut join_predicates = Vec::new();
                    self.factor(&mut join.relation, Some(&*on), &mut join_predicates)?;
                    for predicate in join_predicates {
                        *on = and_predicate(Some(on.clone()), predicate);
                    }
                }
                _ if inner => self.factor(&mut join.relation, existing, out)?,
                _ => {
                    let mut join_predicates = Vec::new();
                    self.factor(&mut join.relation, None, &mut join_predicates)?;
                    if !join_predicates.is_empty() {
                        self.unsupported("outer join without ON", &join.relation)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn factor(
        &mut self,
        relation: &mut TableFactor,
        existing: Option<&Expr>,
        out: &mut Vec<Expr>,
    ) -> Result<(), RewriteError> {
        if let TableFactor::NestedJoin {
            table_with_joins, ..
        } = relation
        {
            return self.table_with_joins(table_with_joins, existing, out);
        }

        match &*relation {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                if args.is_some() {
                    return self.unsupported("table-valued function", relation);
                }
                let Some(table) = base_table_name(name, self.scope) else {
                    return Ok(());
                };
                let qualifier = match alias {
                    Some(alias) => Some(alias.name.value.clone()),
                    None if self.qualify => Some(table.clone()),
                    None => None,
                };
                let target = TableTarget {
                    table,
                    qualifier,
                    fragment: relation.to_string(),
                };
                if let Some(predicate) = (self.predicate_for)(&target, existing)? {
                    out.push(predicate);
                }
                Ok(())
            }
            // Subqueries are rewritten on their own by the dispatcher.
            TableFactor::Derived { .. } => Ok(()),
            other => self.unsupported(table_factor_label(other), other),
        }
    }

    fn unsupported(
        &self,
        construct: &str,
        fragment: &TableFactor,
    ) -> Result<(), RewriteError> {
        if self.strict {
            return Err(unsupported_construct_error(construct, fragment));
        }
        debug!(construct, fragment = %fragment, "leaving unsupported construct unmodified");
        Ok(())
    }
}

fn base_table_name(name: &ObjectName, scope: &QueryScope) -> Option<String> {
    let table = last_name_part(name)?;
    if name.0.len() == 1 && scope.is_cte(table) {
        return None;
    }
    Some(table.to_string())
}

fn count_relations(table: &TableWithJoins) -> usize {
    std::iter::once(&table.relation)
        .chain(table.joins.iter().map(|join| &join.relation))
        .map(|relation| match relation {
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => count_relations(table_with_joins),
            _ => 1,
        })
        .sum()
}

// Returns the join's constraint and whether dropping its filter into WHERE
// keeps the join's meaning.
fn join_constraint_mut(join_operator: &mut JoinOperator) -> (Option<&mut JoinConstraint>, bool) {
    match join_operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::StraightJoin(constraint) => (Some(constraint), true),
        JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint) => (Some(constraint), false),
        JoinOperator::AsOf { constraint, .. } => (Some(constraint), false),
        JoinOperator::CrossApply => (None, true),
        JoinOperator::OuterApply => (None, false),
    }
}

fn table_factor_label(factor: &TableFactor) -> &'static str {
    match factor {
        TableFactor::TableFunction { .. } | TableFactor::Function { .. } => "table function",
        TableFactor::UNNEST { .. } => "UNNEST",
        TableFactor::Pivot { .. } => "PIVOT",
        TableFactor::Unpivot { .. } => "UNPIVOT",
        _ => "table factor",
    }
}
