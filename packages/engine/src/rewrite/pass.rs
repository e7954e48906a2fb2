use sqlparser::ast::{Delete, Insert, Query, Select, Update};

use crate::sql::{QueryScope, SqlStatement, StatementKind};
use crate::{RewriteContext, RewriteError};

/// A rewrite pass. Every hook defaults to leaving the AST untouched, so a pass
/// only implements the statement kinds it cares about.
///
/// Passes run in registration order and each one sees the AST as left by the
/// previous one. A pass must not keep per-call state: the same instance serves
/// concurrent callers.
pub trait RewritePass: Send + Sync {
    fn name(&self) -> &str;

    fn applies_to(&self, _kind: StatementKind) -> bool {
        true
    }

    /// Strict passes fail on constructs they cannot traverse instead of
    /// leaving them unmodified.
    fn strict(&self) -> bool {
        false
    }

    fn rewrite_insert(
        &self,
        _insert: &mut Insert,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        Ok(())
    }

    fn rewrite_update(
        &self,
        _update: &mut Update,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        Ok(())
    }

    fn rewrite_delete(
        &self,
        _delete: &mut Delete,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        Ok(())
    }

    /// Called for every plain `SELECT` block, innermost first.
    fn rewrite_select(
        &self,
        _select: &mut Select,
        _scope: &QueryScope,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        Ok(())
    }

    /// Called once for the outermost query of a select statement, after all
    /// of its select blocks.
    fn rewrite_query(
        &self,
        _query: &mut Query,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        Ok(())
    }

    /// Called last for every statement the pass applies to. The statement may
    /// be replaced, including by one of another kind; later passes see it as
    /// that kind.
    fn rewrite_statement(
        &self,
        _statement: &mut SqlStatement,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        Ok(())
    }
}
