use sqlparser::ast::{
    Assignment, AssignmentTarget, BinaryOperator, Expr, Ident, ObjectName, ObjectNamePart, Update,
    Value as SqlValue,
};

use super::resolve_table;
use crate::errors::unsupported_construct_error;
use crate::rewrite::RewritePass;
use crate::sql::{
    append_selection, equals_predicate, object_name_matches, update_target, StatementKind,
    TableTarget,
};
use crate::{RewriteContext, RewriteError};

pub const DEFAULT_VERSION_KEY: &str = "version";

/// Optimistic locking on updates of versioned tables: the version column is
/// bumped, and when the caller supplies the version it read, the update only
/// matches rows still at that version.
#[derive(Debug, Clone)]
pub struct OptimisticLockPass {
    context_key: String,
    strict: bool,
    require_metadata: bool,
}

impl Default for OptimisticLockPass {
    fn default() -> Self {
        Self {
            context_key: DEFAULT_VERSION_KEY.to_string(),
            strict: false,
            require_metadata: false,
        }
    }
}

impl OptimisticLockPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context key holding the expected version.
    pub fn with_context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = key.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_require_metadata(mut self, require_metadata: bool) -> Self {
        self.require_metadata = require_metadata;
        self
    }
}

impl RewritePass for OptimisticLockPass {
    fn name(&self) -> &str {
        "optimistic_lock"
    }

    fn applies_to(&self, kind: StatementKind) -> bool {
        kind == StatementKind::Update
    }

    fn strict(&self) -> bool {
        self.strict
    }

    fn rewrite_update(
        &self,
        update: &mut Update,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        let Some(target) = update_target(update) else {
            if self.strict {
                return Err(unsupported_construct_error("UPDATE target", &update.table));
            }
            return Ok(());
        };
        let Some(metadata) = resolve_table(context, &target, self.require_metadata)? else {
            return Ok(());
        };
        let Some(column) = metadata.version_column.as_deref() else {
            return Ok(());
        };

        if !assigns_column(&update.assignments, column) {
            // A joined MySQL update needs a qualified SET target; PostgreSQL
            // rejects one, and its FROM form never makes the target ambiguous.
            let qualified = !update.table.joins.is_empty();
            update
                .assignments
                .push(increment(&target, column, qualified));
        }
        if let Some(expected) = context.value(&self.context_key) {
            append_selection(
                &mut update.selection,
                equals_predicate(target.column(column), expected),
            );
        }
        Ok(())
    }
}

fn assigns_column(assignments: &[Assignment], column: &str) -> bool {
    assignments.iter().any(|assignment| match &assignment.target {
        AssignmentTarget::ColumnName(name) => object_name_matches(name, column),
        AssignmentTarget::Tuple(names) => names.iter().any(|name| object_name_matches(name, column)),
    })
}

// `column = column + 1`, the right-hand side qualified like the target.
fn increment(target: &TableTarget, column: &str, qualified: bool) -> Assignment {
    let mut name = Vec::with_capacity(2);
    if let Some(qualifier) = target.qualifier.as_deref().filter(|_| qualified) {
        name.push(ObjectNamePart::Identifier(Ident::new(qualifier)));
    }
    name.push(ObjectNamePart::Identifier(Ident::new(column)));
    Assignment {
        target: AssignmentTarget::ColumnName(ObjectName(name)),
        value: Expr::BinaryOp {
            left: Box::new(target.column(column)),
            op: BinaryOperator::Plus,
            right: Box::new(Expr::Value(
                SqlValue::Number("1".to_string(), false).into(),
            )),
        },
    }
}
