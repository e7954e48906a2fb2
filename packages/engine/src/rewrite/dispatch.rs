use std::ops::ControlFlow;

use sqlparser::ast::{Delete, Insert, Query, Select, SetExpr, Update, VisitMut, VisitorMut};
use tracing::trace;

use super::pass::RewritePass;
use crate::errors::invariant_error;
use crate::sql::{mismatched_value_rows, QueryScope, SqlStatement};
use crate::{RewriteContext, RewriteError};

/// Walks one statement for one pass. Subqueries are handed to the pass before
/// the block that contains them, so clauses a pass injects are never walked.
pub(crate) struct PassDispatch<'p, 'c, 'a> {
    pass: &'p dyn RewritePass,
    context: &'c RewriteContext<'a>,
}

impl<'p, 'c, 'a> PassDispatch<'p, 'c, 'a> {
    pub(crate) fn new(pass: &'p dyn RewritePass, context: &'c RewriteContext<'a>) -> Self {
        Self { pass, context }
    }

    pub(crate) fn statement(&self, statement: &mut SqlStatement) -> Result<(), RewriteError> {
        trace!(pass = self.pass.name(), kind = %statement.kind(), "dispatching statement");
        match statement {
            SqlStatement::Insert(insert) => self.insert(insert),
            SqlStatement::Update(update) => self.update(update),
            SqlStatement::Delete(delete) => self.delete(delete),
            SqlStatement::Select(query) => self.select_statement(query),
            SqlStatement::Other(_) => Ok(()),
        }?;
        self.pass.rewrite_statement(statement, self.context)
    }

    fn insert(&self, insert: &mut Insert) -> Result<(), RewriteError> {
        self.nested_queries(insert, &QueryScope::default())?;

        let parallel_before = mismatched_value_rows(insert).is_empty();
        self.pass.rewrite_insert(insert, self.context)?;
        if parallel_before {
            if let Some((row, width)) = mismatched_value_rows(insert).first() {
                return Err(invariant_error(
                    self.pass.name(),
                    format!(
                        "VALUES row {row} has {width} values for {} columns",
                        insert.columns.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn update(&self, update: &mut Update) -> Result<(), RewriteError> {
        self.nested_queries(update, &QueryScope::default())?;
        self.pass.rewrite_update(update, self.context)
    }

    fn delete(&self, delete: &mut Delete) -> Result<(), RewriteError> {
        self.nested_queries(delete, &QueryScope::default())?;
        self.pass.rewrite_delete(delete, self.context)
    }

    fn select_statement(&self, query: &mut Query) -> Result<(), RewriteError> {
        self.query(query, &QueryScope::default())?;
        self.pass.rewrite_query(query, self.context)
    }

    fn query(&self, query: &mut Query, scope: &QueryScope) -> Result<(), RewriteError> {
        let scope = match query.with.as_mut() {
            Some(with) => {
                let scope = scope.with_ctes(
                    with.cte_tables
                        .iter()
                        .map(|cte| cte.alias.name.value.as_str()),
                );
                for cte in &mut with.cte_tables {
                    self.query(&mut cte.query, &scope)?;
                }
                scope
            }
            None => scope.clone(),
        };
        self.set_expr(&mut query.body, &scope)?;
        self.nested_queries(&mut query.order_by, &scope)?;
        self.nested_queries(&mut query.limit_clause, &scope)?;
        self.nested_queries(&mut query.fetch, &scope)
    }

    fn set_expr(&self, body: &mut SetExpr, scope: &QueryScope) -> Result<(), RewriteError> {
        match body {
            SetExpr::Select(select) => self.plain_select(select, scope),
            SetExpr::SetOperation { left, right, .. } => {
                self.set_expr(left, scope)?;
                self.set_expr(right, scope)
            }
            SetExpr::Query(query) => self.query(query, scope),
            // VALUES lists, TABLE references and nested DML carry no select
            // block of their own, only subqueries.
            other => self.nested_queries(other, scope),
        }
    }

    fn plain_select(&self, select: &mut Select, scope: &QueryScope) -> Result<(), RewriteError> {
        self.nested_queries(select, scope)?;
        self.pass.rewrite_select(select, scope, self.context)
    }

    /// Dispatches every subquery reachable from `node` without crossing
    /// another query: derived tables, and subqueries anywhere in an
    /// expression (projection, join constraints, WHERE, HAVING, assignments).
    fn nested_queries<N: VisitMut>(
        &self,
        node: &mut N,
        scope: &QueryScope,
    ) -> Result<(), RewriteError> {
        let mut walker = NestedQueries {
            dispatch: self,
            scope,
            depth: 0,
        };
        match node.visit(&mut walker) {
            ControlFlow::Break(error) => Err(error),
            ControlFlow::Continue(()) => Ok(()),
        }
    }
}

/// Stops at the outermost query nodes below the visited node and dispatches
/// each of them; queries nested deeper are reached through that dispatch.
struct NestedQueries<'d, 'p, 'c, 'a, 's> {
    dispatch: &'d PassDispatch<'p, 'c, 'a>,
    scope: &'s QueryScope,
    depth: usize,
}

impl VisitorMut for NestedQueries<'_, '_, '_, '_, '_> {
    type Break = RewriteError;

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            if let Err(error) = self.dispatch.query(query, self.scope) {
                return ControlFlow::Break(error);
            }
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &mut Query) -> ControlFlow<Self::Break> {
        self.depth -= 1;
        ControlFlow::Continue(())
    }
}
