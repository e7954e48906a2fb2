#![allow(dead_code)]

use std::sync::Mutex;

use sqlparser::ast::{Expr, Ident, Insert, Select, Update};
use sqlrw_engine::sql::{and_predicate, column_expr, equals_predicate, QueryScope};
use sqlrw_engine::{
    parse_statements, LogicDeleteColumn, MetadataRegistry, RewriteContext, RewriteError,
    RewritePass, SqlDialect, TableMetadata, Value,
};

/// Runs the test body once per dialect that shares the plain DML grammar.
#[macro_export]
macro_rules! dialect_test {
    ($name:ident, |$dialect:ident| $body:expr) => {
        paste::paste! {
            #[test]
            fn [<$name _generic>]() {
                $crate::support::run_dialect(::sqlrw_engine::SqlDialect::Generic, |$dialect| $body);
            }

            #[test]
            fn [<$name _mysql>]() {
                $crate::support::run_dialect(::sqlrw_engine::SqlDialect::MySql, |$dialect| $body);
            }

            #[test]
            fn [<$name _postgresql>]() {
                $crate::support::run_dialect(::sqlrw_engine::SqlDialect::PostgreSql, |$dialect| $body);
            }

            #[test]
            fn [<$name _sqlite>]() {
                $crate::support::run_dialect(::sqlrw_engine::SqlDialect::Sqlite, |$dialect| $body);
            }
        }
    };
}

pub fn run_dialect(dialect: SqlDialect, body: impl FnOnce(SqlDialect)) {
    body(dialect)
}

/// `sql` as the parser prints it back, so expectations compare meaning rather
/// than whitespace.
pub fn canonical(sql: &str, dialect: SqlDialect) -> String {
    parse_statements(sql, dialect)
        .expect("expected SQL should parse")
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

pub fn fixture_registry() -> MetadataRegistry {
    [
        TableMetadata::new("users")
            .with_logic_delete(LogicDeleteColumn::new("deleted"))
            .with_tenant_column("tenant_id"),
        TableMetadata::new("orders")
            .with_logic_delete(LogicDeleteColumn::new("deleted"))
            .with_tenant_column("tenant_id")
            .with_version_column("version"),
        TableMetadata::new("t").with_logic_delete(LogicDeleteColumn::new("deleted")),
        TableMetadata::new("countries").with_ignore_tenant(),
    ]
    .into_iter()
    .collect()
}

/// Pass that leaves every statement as parsed.
pub struct NoopPass;

impl RewritePass for NoopPass {
    fn name(&self) -> &str {
        "noop"
    }
}

/// Appends `column = value` to every select block, update and delete,
/// regardless of the tables involved.
pub struct AppendPredicate {
    pub column: &'static str,
    pub value: Value,
}

impl AppendPredicate {
    pub fn new(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    fn append(&self, selection: &mut Option<Expr>) {
        let predicate = equals_predicate(column_expr(None, self.column), &self.value);
        *selection = Some(and_predicate(selection.take(), predicate));
    }
}

impl RewritePass for AppendPredicate {
    fn name(&self) -> &str {
        "append_predicate"
    }

    fn rewrite_select(
        &self,
        select: &mut Select,
        _scope: &QueryScope,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        self.append(&mut select.selection);
        Ok(())
    }

    fn rewrite_update(
        &self,
        update: &mut Update,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        self.append(&mut update.selection);
        Ok(())
    }

    fn rewrite_delete(
        &self,
        delete: &mut sqlparser::ast::Delete,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        self.append(&mut delete.selection);
        Ok(())
    }
}

/// Records every select block it is handed, in visiting order.
#[derive(Default)]
pub struct RecordSelects {
    pub seen: Mutex<Vec<String>>,
}

impl RewritePass for &'static RecordSelects {
    fn name(&self) -> &str {
        "record_selects"
    }

    fn rewrite_select(
        &self,
        select: &mut Select,
        _scope: &QueryScope,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        self.seen
            .lock()
            .expect("record lock")
            .push(select.to_string());
        Ok(())
    }
}

/// Adds a column to the insert's column list without touching its rows.
pub struct DropsValues;

impl RewritePass for DropsValues {
    fn name(&self) -> &str {
        "drops_values"
    }

    fn rewrite_insert(
        &self,
        insert: &mut Insert,
        _context: &RewriteContext<'_>,
    ) -> Result<(), RewriteError> {
        insert.columns.push(Ident::new("created_by"));
        Ok(())
    }
}
