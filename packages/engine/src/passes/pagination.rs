use serde::{Deserialize, Serialize};
use sqlparser::ast::{Expr, Fetch, LimitClause, Offset, OffsetRows, Query, Value as SqlValue};
use tracing::debug;

use crate::errors::unsupported_construct_error;
use crate::rewrite::RewritePass;
use crate::sql::{SqlDialect, StatementKind};
use crate::{RewriteContext, RewriteError};

/// How a page is spelled in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStyle {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `OFFSET m ROWS FETCH FIRST n ROWS ONLY`
    OffsetFetch,
}

impl PageStyle {
    pub fn for_dialect(dialect: SqlDialect) -> Self {
        match dialect {
            SqlDialect::MsSql => Self::OffsetFetch,
            _ => Self::LimitOffset,
        }
    }
}

/// Applies the context's page to top-level selects. Queries that already
/// limit their rows are left alone.
#[derive(Debug, Clone)]
pub struct PaginationPass {
    style: PageStyle,
    strict: bool,
}

impl PaginationPass {
    pub fn new(style: PageStyle) -> Self {
        Self {
            style,
            strict: false,
        }
    }

    pub fn for_dialect(dialect: SqlDialect) -> Self {
        Self::new(PageStyle::for_dialect(dialect))
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl RewritePass for PaginationPass {
    fn name(&self) -> &str {
        "pagination"
    }

    fn applies_to(&self, kind: StatementKind) -> bool {
        kind == StatementKind::Select
    }

    fn strict(&self) -> bool {
        self.strict
    }

    fn rewrite_query(
        &self,
        query: &mut Query,
        context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        let Some(page) = context.page() else {
            return Ok(());
        };
        if query.limit_clause.is_some() || query.fetch.is_some() {
            debug!("query already limits its rows");
            return Ok(());
        }

        match self.style {
            PageStyle::LimitOffset => {
                query.limit_clause = Some(LimitClause::LimitOffset {
                    limit: Some(number(page.limit)),
                    offset: (page.offset > 0).then(|| Offset {
                        value: number(page.offset),
                        rows: OffsetRows::None,
                    }),
                    limit_by: Vec::new(),
                });
            }
            PageStyle::OffsetFetch => {
                // OFFSET/FETCH is only valid after ORDER BY.
                if query.order_by.is_none() {
                    if self.strict {
                        return Err(unsupported_construct_error(
                            "OFFSET/FETCH without ORDER BY",
                            &*query,
                        ));
                    }
                    debug!("leaving unordered query without a page");
                    return Ok(());
                }
                query.limit_clause = Some(LimitClause::LimitOffset {
                    limit: None,
                    offset: Some(Offset {
                        value: number(page.offset),
                        rows: OffsetRows::Rows,
                    }),
                    limit_by: Vec::new(),
                });
                query.fetch = Some(Fetch {
                    with_ties: false,
                    percent: false,
                    quantity: Some(number(page.limit)),
                });
            }
        }
        Ok(())
    }
}

fn number(value: u64) -> Expr {
    Expr::Value(SqlValue::Number(value.to_string(), false).into())
}
