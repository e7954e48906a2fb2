//! Built-in rewrite passes.

mod audit_column;
mod condition;
mod logic_delete;
mod optimistic_lock;
mod pagination;
mod tenant;

use std::sync::Arc;

use sqlparser::ast::{Expr, Insert};
use tracing::debug;

use crate::errors::{metadata_not_found_error, unsupported_construct_error};
use crate::metadata::TableMetadata;
use crate::sql::{append_insert_column, InsertColumnOutcome, TableTarget};
use crate::{RewriteContext, RewriteError};

pub use audit_column::{AuditColumnPass, AuditValue};
pub use condition::{Condition, ConditionPass};
pub use logic_delete::LogicDeletePass;
pub use optimistic_lock::{OptimisticLockPass, DEFAULT_VERSION_KEY};
pub use pagination::{PageStyle, PaginationPass};
pub use tenant::{TenantPass, DEFAULT_TENANT_KEY};

/// Metadata for `target`. Unknown tables are skipped unless the pass
/// requires metadata for every table it touches.
pub(crate) fn resolve_table(
    context: &RewriteContext<'_>,
    target: &TableTarget,
    require_metadata: bool,
) -> Result<Option<Arc<TableMetadata>>, RewriteError> {
    match context.metadata().resolve(&target.table) {
        Some(metadata) => Ok(Some(metadata)),
        None if require_metadata => Err(metadata_not_found_error(&target.table, &target.fragment)),
        None => Ok(None),
    }
}

/// Threads `column` through an insert. Shapes the column cannot be added to
/// are left alone unless `strict`.
pub(crate) fn insert_column(
    insert: &mut Insert,
    column: &str,
    value: Expr,
    strict: bool,
) -> Result<(), RewriteError> {
    let construct = match append_insert_column(insert, column, value) {
        InsertColumnOutcome::Appended | InsertColumnOutcome::AlreadyPresent => return Ok(()),
        InsertColumnOutcome::NoColumnList => "INSERT without a column list",
        InsertColumnOutcome::Unsupported(construct) => construct,
    };
    if strict {
        return Err(unsupported_construct_error(construct, &insert.table));
    }
    debug!(construct, column, "insert left without injected column");
    Ok(())
}

#[cfg(test)]
pub(crate) fn canonical(sql: &str) -> String {
    crate::sql::join_statements(
        crate::sql::parse_statements(sql, crate::sql::SqlDialect::Generic)
            .expect("parse expected SQL")
            .iter()
            .map(ToString::to_string),
    )
    .unwrap_or_default()
}
