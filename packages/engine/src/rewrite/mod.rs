mod dispatch;
mod pass;

use std::fmt;

use tracing::{debug, Span};

use crate::guard::{AllowAll, Guard};
use crate::sql::{assemble, parse_statements, SqlDialect, SqlInfo, SqlStatement};
use crate::{RewriteContext, RewriteError};

use dispatch::PassDispatch;
pub use pass::RewritePass;

/// Parses SQL, runs the registered passes over every statement and joins the
/// result back into one string.
///
/// Holds no per-call state; one instance can serve concurrent callers.
pub struct SqlRewriter {
    dialect: SqlDialect,
    passes: Vec<Box<dyn RewritePass>>,
    guard: Box<dyn Guard>,
    span: Span,
}

impl SqlRewriter {
    pub fn builder() -> SqlRewriterBuilder {
        SqlRewriterBuilder::default()
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn allow(&self, context: &RewriteContext<'_>) -> bool {
        self.guard.allow(context)
    }

    /// Rewrites `sql`. `None` means nothing was produced: the guard rejected
    /// the call or the text held no statements.
    pub fn parse(
        &self,
        sql: &str,
        context: &RewriteContext<'_>,
    ) -> Result<Option<SqlInfo>, RewriteError> {
        let _entered = self.span.enter();
        if !self.allow(context) {
            debug!(statement_id = ?context.statement_id(), "rewrite skipped by guard");
            return Ok(None);
        }

        debug!(sql, "original SQL");
        let statements = parse_statements(sql, self.dialect)?;
        let mut serialized = Vec::with_capacity(statements.len());
        for statement in statements {
            let statement = self.process_statement(statement.into(), context)?;
            serialized.push((statement.kind(), statement.to_sql()));
        }

        let info = assemble(serialized);
        if let Some(info) = &info {
            debug!(sql = info.sql(), "rewritten SQL");
        }
        Ok(info)
    }

    /// Like [`SqlRewriter::parse`], but falls back to the original text when
    /// nothing was produced.
    pub fn rewrite(&self, sql: &str, context: &RewriteContext<'_>) -> Result<String, RewriteError> {
        Ok(self
            .parse(sql, context)?
            .map(SqlInfo::into_sql)
            .unwrap_or_else(|| sql.to_string()))
    }

    /// Runs every applicable pass over one statement.
    pub fn process_statement(
        &self,
        mut statement: SqlStatement,
        context: &RewriteContext<'_>,
    ) -> Result<SqlStatement, RewriteError> {
        // A pass may change the statement's kind, so it is checked per pass.
        for pass in &self.passes {
            if pass.applies_to(statement.kind()) {
                PassDispatch::new(pass.as_ref(), context).statement(&mut statement)?;
            }
        }
        Ok(statement)
    }
}

impl fmt::Debug for SqlRewriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlRewriter")
            .field("dialect", &self.dialect)
            .field("passes", &self.pass_names())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct SqlRewriterBuilder {
    dialect: SqlDialect,
    passes: Vec<Box<dyn RewritePass>>,
    guard: Option<Box<dyn Guard>>,
    span: Option<Span>,
}

impl SqlRewriterBuilder {
    pub fn dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn pass(self, pass: impl RewritePass + 'static) -> Self {
        self.boxed_pass(Box::new(pass))
    }

    pub fn boxed_pass(mut self, pass: Box<dyn RewritePass>) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn guard(self, guard: impl Guard + 'static) -> Self {
        self.boxed_guard(Box::new(guard))
    }

    pub fn boxed_guard(mut self, guard: Box<dyn Guard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Span entered for every call; the rewriter logs inside it.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> SqlRewriter {
        SqlRewriter {
            dialect: self.dialect,
            passes: self.passes,
            guard: self.guard.unwrap_or_else(|| Box::new(AllowAll)),
            span: self
                .span
                .unwrap_or_else(|| tracing::debug_span!("sql_rewrite")),
        }
    }
}
