use sqlparser::ast::{Delete, Expr, Insert, Select, Update};

use super::{insert_column, resolve_table};
use crate::errors::missing_context_value_error;
use crate::rewrite::RewritePass;
use crate::sql::{
    equals_predicate, insert_target, scope_delete, scope_select, scope_update, value_expr,
    QueryScope, TableTarget,
};
use crate::{RewriteContext, RewriteError, Value};

pub const DEFAULT_TENANT_KEY: &str = "tenant_id";

/// Row-level tenant isolation. Reads are filtered on the tenant column and
/// inserts get the column added with the caller's tenant id.
///
/// The column comes from table metadata, or from `default_column` for tables
/// without one. Tables marked `ignore_tenant` are never touched.
#[derive(Debug, Clone)]
pub struct TenantPass {
    context_key: String,
    default_column: Option<String>,
    strict: bool,
    require_metadata: bool,
}

impl Default for TenantPass {
    fn default() -> Self {
        Self {
            context_key: DEFAULT_TENANT_KEY.to_string(),
            default_column: None,
            strict: false,
            require_metadata: false,
        }
    }
}

impl TenantPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context key holding the tenant id.
    pub fn with_context_key(mut self, key: impl Into<String>) -> Self {
        self.context_key = key.into();
        self
    }

    pub fn with_default_column(mut self, column: impl Into<String>) -> Self {
        self.default_column = Some(column.into());
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

    fn tenant_column(
        &self,
        target: &TableTarget,
        context: &RewriteContext<'_>,
    ) -> Result<Option<String>, RewriteError> {
        match resolve_table(context, target, self.require_metadata)? {
            Some(metadata) if metadata.ignore_tenant => Ok(None),
            Some(metadata) => Ok(metadata
                .tenant_column
                .clone()
                .or_else(|| self.default_column.clone())),
            None => Ok(self.default_column.clone()),
        }
    }

    fn tenant_id<'c>(
        &self,
        target: &TableTarget,
        context: &'c RewriteContext<'_>,
    ) -> Result<&'c Value, RewriteError> {
        context
            .value(&self.context_key)
            .ok_or_else(|| missing_context_value_error(&self.context_key, &target.fragment))
    }

    fn predicate(
        &self,
        target: &TableTarget,
        context: &RewriteContext<'_>,
    ) -> Result<Option<Expr>, RewriteError> {
        let Some(column) = self.tenant_column(target, context)? else {
            return Ok(None);
        };
        let tenant_id = self.tenant_id(target, context)?;
        Ok(Some(equals_predicate(target.column(&column), tenant_id)))
    }
}

impl RewritePass for TenantPass {
    fn name(&self) -> &str {
        "tenant"
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
        let Some(column) = self.tenant_column(&target, context)? else {
            return Ok(());
        };
        let value = value_expr(self.tenant_id(&target, context)?);
        insert_column(insert, &column, value, self.strict)
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
