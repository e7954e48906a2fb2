use sqlparser::ast::helpers::attached_token::AttachedToken;
use sqlparser::ast::{
    Assignment, AssignmentTarget, Delete, Expr, FromTable, Ident, ObjectName, ObjectNamePart,
    Select, TableFactor, Update,
};
use tracing::debug;

use super::resolve_table;
use crate::errors::unsupported_construct_error;
use crate::rewrite::RewritePass;
use crate::sql::{
    equals_predicate, expr_references_column, scope_delete, scope_select, scope_update,
    value_expr, QueryScope, SqlStatement, StatementKind, TableTarget,
};
use crate::{RewriteContext, RewriteError};

/// Hides logically deleted rows: every table with a logic-delete column gets
/// `column = <not deleted value>` ANDed onto the predicate that filters it.
///
/// The filter is skipped when the predicate already mentions the column
/// anywhere, including under `OR` (`deleted = 0 OR 1 = 1`). Such a statement
/// can see deleted rows; the caller owns that predicate.
///
/// With soft delete enabled, a single-table `DELETE` becomes
/// `UPDATE .. SET column = <deleted value>` with the same filter.
#[derive(Debug, Clone, Default)]
pub struct LogicDeletePass {
    strict: bool,
    require_metadata: bool,
    soft_delete: bool,
}

impl LogicDeletePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_require_metadata(mut self, require_metadata: bool) -> Self {
        self.require_metadata = require_metadata;
        self
    }

    /// Turn deletes of logic-delete tables into updates of the marker column.
    pub fn with_soft_delete(mut self, soft_delete: bool) -> Self {
        self.soft_delete = soft_delete;
        self
    }

    fn soft_delete_update(
        &self,
        delete: &mut Delete,
        context: &RewriteContext<'_>,
    ) -> Result<Option<Update>, RewriteError> {
        let Some(target) = delete_target(delete) else {
            return self.unsupported("multi-table DELETE", &*delete);
        };
        let Some(metadata) = resolve_table(context, &target, self.require_metadata)? else {
            return Ok(None);
        };
        let Some(logic_delete) = &metadata.logic_delete else {
            return Ok(None);
        };
        if !delete.order_by.is_empty() {
            return self.unsupported("DELETE .. ORDER BY", &*delete);
        }
        let (FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables)) =
            &mut delete.from;
        let Some(table) = tables.pop() else {
            return Ok(None);
        };

        Ok(Some(Update {
            update_token: AttachedToken::empty(),
            table,
            assignments: vec![Assignment {
                target: AssignmentTarget::ColumnName(ObjectName(vec![
                    ObjectNamePart::Identifier(Ident::new(&logic_delete.column)),
                ])),
                value: value_expr(&logic_delete.deleted_value),
            }],
            from: None,
            selection: delete.selection.take(),
            returning: delete.returning.take(),
            or: None,
            limit: delete.limit.take(),
        }))
    }

    fn unsupported<T>(&self, construct: &str, fragment: &Delete) -> Result<Option<T>, RewriteError> {
        if self.strict {
            return Err(unsupported_construct_error(construct, fragment));
        }
        debug!(construct, fragment = %fragment, "keeping DELETE as a hard delete");
        Ok(None)
    }

    fn predicate(
        &self,
        target: &TableTarget,
        existing: Option<&Expr>,
        context: &RewriteContext<'_>,
    ) -> Result<Option<Expr>, RewriteError> {
        let Some(metadata) = resolve_table(context, target, self.require_metadata)? else {
            return Ok(None);
        };
        let Some(logic_delete) = &metadata.logic_delete else {
            return Ok(None);
        };
        // A caller filtering on the column already decides which rows it sees.
        if existing.is_some_and(|expr| {
            expr_references_column(expr, &logic_delete.column, target.qualifier.as_deref())
        }) {
            return Ok(None);
        }
        Ok(Some(equals_predicate(
            target.column(&logic_delete.column),
            &logic_delete.not_deleted_value,
        )))
    }
}

impl RewritePass for LogicDeletePass {
    fn name(&self) -> &str {
        "logic_delete"
    }

    fn applies_to(&self, kind: StatementKind) -> bool {
        matches!(
            kind,
            StatementKind::Select | StatementKind::Update | StatementKind::Delete
        )
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
        scope_select(select, scope, self.strict, &mut |target, existing| {
            self.predicate(target, existing, context)
        })
    }

    fn rewrite_update(
        &self,
        update: &mut Update,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        scope_update(update, self.strict, &mut |target, existing| {
            self.predicate(target, existing, context)
        })
    }

    fn rewrite_delete(
        &self,
        delete: &mut Delete,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        scope_delete(delete, self.strict, &mut |target, existing| {
            self.predicate(target, existing, context)
        })
    }

    fn rewrite_statement(
        &self,
        statement: &mut SqlStatement,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        if !self.soft_delete {
            return Ok(());
        }
        let SqlStatement::Delete(delete) = statement else {
            return Ok(());
        };
        if let Some(update) = self.soft_delete_update(delete, context)? {
            *statement = SqlStatement::Update(update);
        }
        Ok(())
    }
}

// The one base table of a plain `DELETE FROM t [WHERE ..]`.
fn delete_target(delete: &Delete) -> Option<TableTarget> {
    let (FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables)) = &delete.from;
    let [table] = tables.as_slice() else {
        return None;
    };
    if !delete.tables.is_empty() || delete.using.is_some() || !table.joins.is_empty() {
        return None;
    }
    let TableFactor::Table {
        name,
        alias,
        args: None,
        ..
    } = &table.relation
    else {
        return None;
    };
    Some(TableTarget {
        table: name.0.last()?.as_ident()?.value.clone(),
        qualifier: alias.as_ref().map(|alias| alias.name.value.clone()),
        fragment: table.relation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::LogicDeletePass;
    use crate::metadata::{LogicDeleteColumn, MetadataRegistry, TableMetadata};
    use crate::passes::canonical;
    use crate::rewrite::SqlRewriter;
    use crate::sql::StatementKind;
    use crate::{RewriteContext, RewriteError, Value};

    fn registry() -> MetadataRegistry {
        let mut archived = LogicDeleteColumn::new("archived_at");
        archived.not_deleted_value = Value::Null;
        [
            TableMetadata::new("sys_user").with_logic_delete(LogicDeleteColumn::new("deleted")),
            TableMetadata::new("sys_role").with_logic_delete(LogicDeleteColumn::new("deleted")),
            TableMetadata::new("document").with_logic_delete(archived),
            TableMetadata::new("audit_log"),
        ]
        .into_iter()
        .collect()
    }

    fn rewrite(pass: LogicDeletePass, sql: &str) -> Result<String, RewriteError> {
        let registry = registry();
        let rewriter = SqlRewriter::builder().pass(pass).build();
        rewriter.rewrite(sql, &RewriteContext::new(&registry))
    }

    #[test]
    fn select_gets_not_deleted_filter() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "SELECT id, name FROM sys_user WHERE id = 5").unwrap(),
            canonical("SELECT id, name FROM sys_user WHERE id = 5 AND deleted = 0")
        );
    }

    #[test]
    fn update_and_delete_are_filtered() {
        assert_eq!(
            rewrite(
                LogicDeletePass::new(),
                "UPDATE sys_user SET name = 'a' WHERE id = 1 OR id = 2; DELETE FROM sys_user"
            )
            .unwrap(),
            canonical(
                "UPDATE sys_user SET name = 'a' WHERE (id = 1 OR id = 2) AND deleted = 0; \
                 DELETE FROM sys_user WHERE deleted = 0"
            )
        );
    }

    #[test]
    fn null_marker_becomes_is_null() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "SELECT * FROM document d").unwrap(),
            canonical("SELECT * FROM document d WHERE d.archived_at IS NULL")
        );
    }

    #[test]
    fn explicit_filter_on_the_column_is_respected() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "SELECT * FROM sys_user WHERE deleted = 1").unwrap(),
            canonical("SELECT * FROM sys_user WHERE deleted = 1")
        );
    }

    #[test]
    fn joins_and_subqueries_are_filtered_per_table() {
        assert_eq!(
            rewrite(
                LogicDeletePass::new(),
                "SELECT u.id FROM sys_user u JOIN sys_role r ON r.id = u.role_id \
                 WHERE u.id IN (SELECT user_id FROM sys_role)"
            )
            .unwrap(),
            canonical(
                "SELECT u.id FROM sys_user u JOIN sys_role r ON r.id = u.role_id AND r.deleted = 0 \
                 WHERE u.id IN (SELECT user_id FROM sys_role WHERE deleted = 0) AND u.deleted = 0"
            )
        );
    }

    #[test]
    fn tables_without_logic_delete_are_untouched() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "SELECT * FROM audit_log").unwrap(),
            canonical("SELECT * FROM audit_log")
        );
    }

    #[test]
    fn unknown_tables_fail_only_when_metadata_is_required() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "SELECT * FROM unknown").unwrap(),
            canonical("SELECT * FROM unknown")
        );
        match rewrite(
            LogicDeletePass::new().with_require_metadata(true),
            "SELECT * FROM unknown",
        ) {
            Err(RewriteError::MetadataResolution { table, fragment }) => {
                assert_eq!(table, "unknown");
                assert_eq!(fragment, "unknown");
            }
            other => panic!("expected metadata resolution error, got {other:?}"),
        }
    }

    #[test]
    fn inserts_are_not_touched() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "INSERT INTO sys_user (id) VALUES (1)").unwrap(),
            canonical("INSERT INTO sys_user (id) VALUES (1)")
        );
    }

    #[test]
    fn any_mention_of_the_column_disables_the_filter() {
        assert_eq!(
            rewrite(LogicDeletePass::new(), "SELECT * FROM sys_user WHERE deleted = 0 OR 1 = 1")
                .unwrap(),
            canonical("SELECT * FROM sys_user WHERE deleted = 0 OR 1 = 1")
        );
    }

    #[test]
    fn soft_delete_turns_delete_into_update() {
        let pass = LogicDeletePass::new().with_soft_delete(true);
        assert_eq!(
            rewrite(pass.clone(), "DELETE FROM sys_user u WHERE u.id = 7").unwrap(),
            canonical("UPDATE sys_user u SET deleted = 1 WHERE u.id = 7 AND u.deleted = 0")
        );
        assert_eq!(
            rewrite(pass, "DELETE FROM audit_log WHERE id = 7").unwrap(),
            canonical("DELETE FROM audit_log WHERE id = 7")
        );
    }

    #[test]
    fn soft_delete_reports_the_update_kind() {
        let registry = registry();
        let info = SqlRewriter::builder()
            .pass(LogicDeletePass::new().with_soft_delete(true))
            .build()
            .parse("DELETE FROM sys_user", &RewriteContext::new(&registry))
            .unwrap()
            .unwrap();
        assert_eq!(info.kinds(), &[StatementKind::Update]);
    }

    #[test]
    fn multi_table_delete_stays_a_hard_delete_unless_strict() {
        let sql = "DELETE FROM sys_user USING sys_role WHERE sys_role.id = sys_user.role_id";
        assert_eq!(
            rewrite(LogicDeletePass::new().with_soft_delete(true), sql).unwrap(),
            canonical(
                "DELETE FROM sys_user USING sys_role WHERE sys_role.id = sys_user.role_id \
                 AND sys_user.deleted = 0 AND sys_role.deleted = 0"
            )
        );
        match rewrite(
            LogicDeletePass::new().with_soft_delete(true).with_strict(true),
            sql,
        ) {
            Err(RewriteError::UnsupportedConstruct { construct, .. }) => {
                assert_eq!(construct, "multi-table DELETE")
            }
            other => panic!("expected unsupported construct, got {other:?}"),
        }
    }
}
