use std::ops::ControlFlow;

use sqlparser::ast::{Expr, Query, Visit, Visitor};

/// Whether `expr` mentions `column`, either bare or qualified by `qualifier`.
/// Columns inside nested subqueries belong to another scope and are ignored.
pub(crate) fn expr_references_column(expr: &Expr, column: &str, qualifier: Option<&str>) -> bool {
    struct Collector<'a> {
        column: &'a str,
        qualifier: Option<&'a str>,
        query_depth: usize,
    }

    impl Visitor for Collector<'_> {
        type Break = ();

        fn pre_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
            self.query_depth += 1;
            ControlFlow::Continue(())
        }

        fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
            self.query_depth -= 1;
            ControlFlow::Continue(())
        }

        fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
            if self.query_depth > 0 {
                return ControlFlow::Continue(());
            }
            let matched = match expr {
                Expr::Identifier(ident) => ident.value.eq_ignore_ascii_case(self.column),
                Expr::CompoundIdentifier(parts) => match parts.as_slice() {
                    [.., owner, last] => {
                        last.value.eq_ignore_ascii_case(self.column)
                            && self
                                .qualifier
                                .is_none_or(|qualifier| owner.value.eq_ignore_ascii_case(qualifier))
                    }
                    [last] => last.value.eq_ignore_ascii_case(self.column),
                    [] => false,
                },
                _ => false,
            };
            if matched {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    let mut collector = Collector {
        column,
        qualifier,
        query_depth: 0,
    };
    expr.visit(&mut collector).is_break()
}
