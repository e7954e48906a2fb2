use std::fmt;

use sqlparser::ast::{Delete, Expr, Select, Update};

use super::resolve_table;
use crate::property::{AccessorNames, PropertyResolver};
use crate::rewrite::RewritePass;
use crate::sql::{
    equals_predicate, join_conjunction, scope_delete, scope_select, scope_update, QueryScope,
    StatementKind, TableTarget,
};
use crate::{RewriteContext, RewriteError, Value};

/// `property = value` on one table. The property may be given by accessor
/// name (`getRoleId`) and is mapped to its column through table metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub property: String,
    pub value: Value,
}

/// Adds fixed conditions to every statement touching one table.
pub struct ConditionPass {
    name: String,
    table: String,
    conditions: Vec<Condition>,
    resolver: Box<dyn PropertyResolver>,
    strict: bool,
}

impl ConditionPass {
    pub fn for_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            name: format!("condition:{table}"),
            table,
            conditions: Vec::new(),
            resolver: Box::new(AccessorNames),
            strict: false,
        }
    }

    pub fn eq(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            property: property.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_resolver(mut self, resolver: impl PropertyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn predicate(
        &self,
        target: &TableTarget,
        context: &RewriteContext<'_>,
    ) -> Result<Option<Expr>, RewriteError> {
        if !target.table.eq_ignore_ascii_case(&self.table) {
            return Ok(None);
        }
        let metadata = resolve_table(context, target, false)?;
        let predicates = self
            .conditions
            .iter()
            .map(|condition| {
                let property = self.resolver.resolve_property(&condition.property);
                let column = match &metadata {
                    Some(metadata) => metadata.column_for_property(&property),
                    None => property,
                };
                equals_predicate(target.column(&column), &condition.value)
            })
            .collect();
        Ok(join_conjunction(predicates))
    }
}

impl fmt::Debug for ConditionPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionPass")
            .field("table", &self.table)
            .field("conditions", &self.conditions)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl RewritePass for ConditionPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn applies_to(&self, kind: StatementKind) -> bool {
        kind != StatementKind::Insert && kind != StatementKind::Other
    }

    fn strict(&self) -> bool {
        self.strict
    }

    fn rewrite_select(
        &self,
        select: &mut Select,
        scope: &QueryScope,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        scope_select(select, scope, self.strict, &mut |target, _| {
            self.predicate(target, context)
        })
    }

    fn rewrite_update(
        &self,
        update: &mut Update,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        scope_update(update, self.strict, &mut |target, _| {
            self.predicate(target, context)
        })
    }

    fn rewrite_delete(
        &self,
        delete: &mut Delete,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        scope_delete(delete, self.strict, &mut |target, _| {
            self.predicate(target, context)
        })
    }
}
