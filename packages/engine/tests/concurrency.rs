mod support;

use std::sync::Arc;
use std::thread;

use sqlrw_engine::passes::{LogicDeletePass, TenantPass};
use sqlrw_engine::{
    LogicDeleteColumn, MetadataResolver, RewriteContext, SqlRewriter, TableMetadata,
};
use support::fixture_registry;

#[test]
fn one_rewriter_serves_many_threads() {
    let registry = fixture_registry();
    let rewriter = SqlRewriter::builder()
        .pass(LogicDeletePass::new())
        .pass(TenantPass::new())
        .build();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8i64)
            .map(|tenant| {
                let rewriter = &rewriter;
                let registry = &registry;
                scope.spawn(move || {
                    let context = RewriteContext::new(registry).with_value("tenant_id", tenant);
                    for _ in 0..50 {
                        let sql = rewriter
                            .rewrite("SELECT * FROM orders WHERE id = 1", &context)
                            .expect("rewrite");
                        assert_eq!(
                            sql,
                            format!(
                                "SELECT * FROM orders WHERE id = 1 AND deleted = 0 AND tenant_id = {tenant}"
                            )
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("rewrite thread panicked");
        }
    });
}

#[test]
fn registry_updates_are_seen_as_whole_entries() {
    let registry = Arc::new(fixture_registry());
    let rewriter = Arc::new(SqlRewriter::builder().pass(LogicDeletePass::new()).build());

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for round in 0..200 {
                let column = if round % 2 == 0 { "removed" } else { "archived" };
                registry.register(
                    TableMetadata::new("invoice").with_logic_delete(LogicDeleteColumn::new(column)),
                );
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let rewriter = Arc::clone(&rewriter);
            thread::spawn(move || {
                for _ in 0..200 {
                    let context = RewriteContext::new(registry.as_ref());
                    let sql = rewriter
                        .rewrite("DELETE FROM invoice", &context)
                        .expect("rewrite");
                    assert!(
                        sql == "DELETE FROM invoice"
                            || sql == "DELETE FROM invoice WHERE removed = 0"
                            || sql == "DELETE FROM invoice WHERE archived = 0",
                        "unexpected rewrite: {sql}"
                    );
                }
            })
        })
        .collect();

    writer.join().expect("writer panicked");
    for reader in readers {
        reader.join().expect("reader panicked");
    }
    assert!(registry.resolve("INVOICE").is_some());
}
