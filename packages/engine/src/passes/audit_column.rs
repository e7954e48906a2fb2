use std::collections::BTreeSet;

use sqlparser::ast::{Expr, Insert};

use super::insert_column;
use crate::errors::missing_context_value_error;
use crate::rewrite::RewritePass;
use crate::sql::{insert_target, value_expr, StatementKind};
use crate::{RewriteContext, RewriteError};

/// Where an audit column takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditValue {
    /// A value the caller puts in the rewrite context under this key.
    Context(String),
    /// A SQL expression evaluated by the database, e.g. `CURRENT_TIMESTAMP`.
    Expr(Expr),
}

/// Fills an audit column (`created_by`, `created_at`, ...) on inserts that do
/// not set it.
#[derive(Debug, Clone)]
pub struct AuditColumnPass {
    name: String,
    column: String,
    value: AuditValue,
    tables: BTreeSet<String>,
    strict: bool,
}

impl AuditColumnPass {
    pub fn new(column: impl Into<String>, value: AuditValue) -> Self {
        let column = column.into();
        Self {
            name: format!("audit_column:{column}"),
            column,
            value,
            tables: BTreeSet::new(),
            strict: false,
        }
    }

    /// Restricts the pass to these tables. Without any, every table is audited.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tables = tables
            .into_iter()
            .map(|table| table.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn covers(&self, table: &str) -> bool {
        self.tables.is_empty() || self.tables.contains(&table.to_ascii_lowercase())
    }
}

impl RewritePass for AuditColumnPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies_to(&self, kind: StatementKind) -> bool {
        kind == StatementKind::Insert
    }

    fn strict(&self) -> bool {
        self.strict
    }

    fn rewrite_insert(
        &self,
        insert: &mut Insert,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        let Some(target) = insert_target(insert) else {
            return Ok(());
        };
        if !self.covers(&target.table) {
            return Ok(());
        }
        let value = match &self.value {
            AuditValue::Context(key) => value_expr(
                context
                    .value(key)
                    .ok_or_else(|| missing_context_value_error(key, &target.fragment))?,
            ),
            AuditValue::Expr(expr) => expr.clone(),
        };
        insert_column(insert, &self.column, value, self.strict)
    }
}
