mod ast_ref;
mod ast_utils;
mod insert_columns;
mod parse;
mod reassemble;
mod scope;
mod statement;

pub(crate) use ast_ref::expr_references_column;
pub(crate) use ast_utils::{append_selection, join_conjunction, object_name_matches};
pub use ast_utils::{and_predicate, column_expr, equals_predicate, value_expr};
pub(crate) use insert_columns::mismatched_value_rows;
pub use insert_columns::{append_insert_column, insert_has_column, InsertColumnOutcome};
pub use parse::{parse_expr, parse_statements, SqlDialect};
pub(crate) use reassemble::assemble;
pub use reassemble::{join_statements, SqlInfo};
pub use scope::{
    insert_target, scope_delete, scope_select, scope_update, update_target, PredicateFn,
    QueryScope, TableTarget,
};
pub use statement::{SqlStatement, StatementKind};
