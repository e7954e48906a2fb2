use std::collections::BTreeSet;

use crate::RewriteContext;

/// Decides, once per call, whether any rewriting happens.
pub trait Guard: Send + Sync {
    fn allow(&self, context: &RewriteContext<'_>) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Guard for AllowAll {
    fn allow(&self, _context: &RewriteContext<'_>) -> bool {
        true
    }
}

/// Opts listed call sites out of rewriting, e.g. a mapper method that
/// physically deletes rows on purpose.
#[derive(Debug, Default, Clone)]
pub struct IgnoreStatements {
    statement_ids: BTreeSet<String>,
}

impl IgnoreStatements {
    pub fn new<I, S>(statement_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statement_ids: statement_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statement_ids.is_empty()
    }
}

impl Guard for IgnoreStatements {
    fn allow(&self, context: &RewriteContext<'_>) -> bool {
        context
            .statement_id()
            .is_none_or(|statement_id| !self.statement_ids.contains(statement_id))
    }
}

impl<F> Guard for F
where
    F: Fn(&RewriteContext<'_>) -> bool + Send + Sync,
{
    fn allow(&self, context: &RewriteContext<'_>) -> bool {
        self(context)
    }
}
