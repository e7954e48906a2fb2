use crate::error::CliError;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, ContentArrangement, Row, Table};
use serde::Serialize;
use sqlrw_engine::{parse_statements, SqlDialect, SqlInfo, SqlStatement, StatementKind};

/// What a rewrite produced; `sql` is the original text when nothing was
/// rewritten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteReport {
    pub sql: String,
    pub rewritten: bool,
    pub kinds: Vec<StatementKind>,
}

impl RewriteReport {
    pub fn new(original: &str, info: Option<SqlInfo>) -> Self {
        match info {
            Some(info) => Self {
                kinds: info.kinds().to_vec(),
                sql: info.into_sql(),
                rewritten: true,
            },
            None => Self {
                sql: original.to_string(),
                rewritten: false,
                kinds: Vec::new(),
            },
        }
    }
}

pub fn print_rewrite_text(report: &RewriteReport) {
    println!("{}", report.sql);
}

pub fn print_rewrite_json(report: &RewriteReport) {
    println!(
        "{}",
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_rewrite_table(report: &RewriteReport, dialect: SqlDialect) -> Result<(), CliError> {
    if !report.rewritten {
        println!("{}", report.sql);
        println!("(not rewritten)");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(Row::from(vec![
            Cell::new("#"),
            Cell::new("kind"),
            Cell::new("sql"),
        ]));

    let statements = parse_statements(&report.sql, dialect)?;
    for (index, statement) in statements.into_iter().enumerate() {
        let statement = SqlStatement::from(statement);
        table.add_row(Row::from(vec![
            Cell::new(index + 1),
            Cell::new(statement.kind()),
            Cell::new(statement.to_sql()),
        ]));
    }

    println!("{table}");
    println!("({} statements)", report.kinds.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::RewriteReport;
    use sqlrw_engine::{RewriteContext, SqlRewriter};

    #[test]
    fn report_json_names_statement_kinds() {
        let info = SqlRewriter::builder()
            .build()
            .parse("SELECT 1; DELETE FROM t", &RewriteContext::default())
            .unwrap();
        let report = RewriteReport::new("SELECT 1; DELETE FROM t", info);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "sql": "SELECT 1;DELETE FROM t",
                "rewritten": true,
                "kinds": ["select", "delete"],
            })
        );
    }

    #[test]
    fn report_without_output_keeps_original() {
        let report = RewriteReport::new("SELECT  1", None);
        assert!(!report.rewritten);
        assert_eq!(report.sql, "SELECT  1");
        assert!(report.kinds.is_empty());
    }
}
