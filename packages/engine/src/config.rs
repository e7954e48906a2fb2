//! JSON rewrite configuration.
//!
//! ```json
//! {
//!   "dialect": "mysql",
//!   "ignore_statements": ["UserMapper.purge"],
//!   "tables": [{ "table": "sys_user", "logic_delete": { "column": "deleted" } }],
//!   "logic_delete": {},
//!   "tenant": { "column": "tenant_id" },
//!   "audit_columns": [{ "column": "created_at", "expr": "CURRENT_TIMESTAMP" }],
//!   "pagination": {}
//! }
//! ```
//!
//! A present section enables its pass unless it says `"enabled": false`.
//! Passes are registered in the order of the fields below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::config_error;
use crate::guard::IgnoreStatements;
use crate::metadata::{MetadataRegistry, TableMetadata};
use crate::passes::{
    AuditColumnPass, AuditValue, LogicDeletePass, OptimisticLockPass, PageStyle, PaginationPass,
    TenantPass,
};
use crate::rewrite::SqlRewriter;
use crate::sql::{parse_expr, SqlDialect};
use crate::RewriteError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    #[serde(default)]
    pub dialect: SqlDialect,
    /// Statement ids that are never rewritten.
    #[serde(default)]
    pub ignore_statements: Vec<String>,
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_delete: Option<LogicDeleteConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<TenantConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic_lock: Option<OptimisticLockConfig>,
    #[serde(default)]
    pub audit_columns: Vec<AuditColumnConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogicDeleteConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub require_metadata: bool,
    /// Rewrite deletes into updates that set the deleted value.
    #[serde(default)]
    pub soft_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub require_metadata: bool,
    #[serde(default = "default_tenant_key")]
    pub context_key: String,
    /// Tenant column for tables whose metadata names none.
    #[serde(default)]
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimisticLockConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub require_metadata: bool,
    #[serde(default = "default_version_key")]
    pub context_key: String,
}

/// One audit column. Exactly one of `context_key` and `expr` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditColumnConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub strict: bool,
    pub column: String,
    #[serde(default)]
    pub context_key: Option<String>,
    #[serde(default)]
    pub expr: Option<String>,
    /// Tables to audit; empty means all.
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub strict: bool,
    /// Defaults to the dialect's style.
    #[serde(default)]
    pub style: Option<PageStyle>,
}

fn enabled() -> bool {
    true
}

fn default_tenant_key() -> String {
    crate::passes::DEFAULT_TENANT_KEY.to_string()
}

fn default_version_key() -> String {
    crate::passes::DEFAULT_VERSION_KEY.to_string()
}

impl RewriteConfig {
    pub fn from_json(text: &str) -> Result<Self, RewriteError> {
        serde_json::from_str(text).map_err(|error| config_error(error.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, RewriteError> {
        let text = std::fs::read_to_string(path)
            .map_err(|error| config_error(format!("{}: {error}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|error| config_error(format!("{}: {error}", path.display())))
    }

    /// Builds the rewriter together with the registry its callers should
    /// resolve metadata from.
    pub fn build(&self) -> Result<(SqlRewriter, MetadataRegistry), RewriteError> {
        let registry: MetadataRegistry = self.tables.iter().cloned().collect();
        let mut builder = SqlRewriter::builder()
            .dialect(self.dialect)
            .span(tracing::debug_span!("sql_rewrite", dialect = ?self.dialect));

        if !self.ignore_statements.is_empty() {
            builder = builder.guard(IgnoreStatements::new(self.ignore_statements.iter().cloned()));
        }
        if let Some(section) = self.logic_delete.as_ref().filter(|section| section.enabled) {
            builder = builder.pass(
                LogicDeletePass::new()
                    .with_strict(section.strict)
                    .with_require_metadata(section.require_metadata)
                    .with_soft_delete(section.soft_delete),
            );
        }
        if let Some(section) = self.tenant.as_ref().filter(|section| section.enabled) {
            let mut pass = TenantPass::new()
                .with_context_key(&section.context_key)
                .with_strict(section.strict)
                .with_require_metadata(section.require_metadata);
            if let Some(column) = &section.column {
                pass = pass.with_default_column(column);
            }
            builder = builder.pass(pass);
        }
        if let Some(section) = self.optimistic_lock.as_ref().filter(|section| section.enabled) {
            builder = builder.pass(
                OptimisticLockPass::new()
                    .with_context_key(&section.context_key)
                    .with_strict(section.strict)
                    .with_require_metadata(section.require_metadata),
            );
        }
        for section in self.audit_columns.iter().filter(|section| section.enabled) {
            builder = builder.pass(section.pass(self.dialect)?);
        }
        if let Some(section) = self.pagination.as_ref().filter(|section| section.enabled) {
            let style = section
                .style
                .unwrap_or_else(|| PageStyle::for_dialect(self.dialect));
            builder = builder.pass(PaginationPass::new(style).with_strict(section.strict));
        }

        let rewriter = builder.build();
        debug!(passes = ?rewriter.pass_names(), tables = registry.len(), "rewriter configured");
        Ok((rewriter, registry))
    }
}

impl AuditColumnConfig {
    fn pass(&self, dialect: SqlDialect) -> Result<AuditColumnPass, RewriteError> {
        let value = match (&self.context_key, &self.expr) {
            (Some(key), None) => AuditValue::Context(key.clone()),
            (None, Some(expr)) => AuditValue::Expr(parse_expr(expr, dialect).map_err(|error| {
                config_error(format!("audit column `{}`: {error}", self.column))
            })?),
            _ => {
                return Err(config_error(format!(
                    "audit column `{}` needs exactly one of `context_key` and `expr`",
                    self.column
                )))
            }
        };
        Ok(AuditColumnPass::new(&self.column, value)
            .with_tables(&self.tables)
            .with_strict(self.strict))
    }
}

#[cfg(test)]
mod tests {
    use super::RewriteConfig;
    use crate::passes::canonical;
    use crate::{Page, RewriteContext, RewriteError, SqlDialect};

    const CONFIG: &str = r#"{
        "ignore_statements": ["UserMapper.purge"],
        "tables": [
            { "table": "sys_user", "logic_delete": { "column": "deleted" }, "version_column": "version" },
            { "table": "country", "ignore_tenant": true }
        ],
        "logic_delete": {},
        "tenant": { "column": "tenant_id" },
        "optimistic_lock": {},
        "audit_columns": [
            { "column": "created_by", "context_key": "user", "tables": ["sys_user"] },
            { "column": "created_at", "expr": "CURRENT_TIMESTAMP", "enabled": false }
        ],
        "pagination": {}
    }"#;

    #[test]
    fn full_config_builds_passes_in_order() {
        let (rewriter, registry) = RewriteConfig::from_json(CONFIG).unwrap().build().unwrap();
        assert_eq!(
            rewriter.pass_names(),
            vec![
                "logic_delete",
                "tenant",
                "optimistic_lock",
                "audit_column:created_by",
                "pagination"
            ]
        );
        assert_eq!(registry.table_names(), vec!["country", "sys_user"]);
        assert_eq!(rewriter.dialect(), SqlDialect::Generic);
    }

    #[test]
    fn configured_rewriter_applies_every_concern() {
        let (rewriter, registry) = RewriteConfig::from_json(CONFIG).unwrap().build().unwrap();
        let context = RewriteContext::new(&registry)
            .with_value("tenant_id", 4)
            .with_value("user", "alice")
            .with_page(Page::of(2, 10));

        assert_eq!(
            rewriter
                .rewrite("SELECT * FROM sys_user u JOIN country c ON c.id = u.country_id", &context)
                .unwrap(),
            canonical(
                "SELECT * FROM sys_user u JOIN country c ON c.id = u.country_id \
                 WHERE u.deleted = 0 AND u.tenant_id = 4 LIMIT 10 OFFSET 10"
            )
        );
        assert_eq!(
            rewriter
                .rewrite("INSERT INTO sys_user (id) VALUES (1)", &context)
                .unwrap(),
            canonical("INSERT INTO sys_user (id, tenant_id, created_by) VALUES (1, 4, 'alice')")
        );
    }

    #[test]
    fn ignored_statements_are_returned_unchanged() {
        let (rewriter, registry) = RewriteConfig::from_json(CONFIG).unwrap().build().unwrap();
        let context = RewriteContext::new(&registry).with_statement_id("UserMapper.purge");
        let sql = "DELETE  FROM sys_user";
        assert_eq!(rewriter.rewrite(sql, &context).unwrap(), sql);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = RewriteConfig::from_json(r#"{ "tenant": { "colum": "x" } }"#).unwrap_err();
        assert!(matches!(error, RewriteError::Config(message) if message.contains("colum")));
    }

    #[test]
    fn audit_column_needs_exactly_one_source() {
        let config = RewriteConfig::from_json(
            r#"{ "audit_columns": [{ "column": "created_at", "expr": "NOW()", "context_key": "now" }] }"#,
        )
        .unwrap();
        assert!(matches!(config.build(), Err(RewriteError::Config(_))));
    }

    #[test]
    fn bad_audit_expression_is_a_config_error() {
        let config = RewriteConfig::from_json(
            r#"{ "audit_columns": [{ "column": "created_at", "expr": "NOW(" }] }"#,
        )
        .unwrap();
        match config.build() {
            Err(RewriteError::Config(message)) => assert!(message.contains("created_at")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_rewrites_nothing() {
        let (rewriter, registry) = RewriteConfig::default().build().unwrap();
        assert!(rewriter.pass_names().is_empty());
        assert_eq!(
            rewriter
                .rewrite("SELECT 1", &RewriteContext::new(&registry))
                .unwrap(),
            "SELECT 1"
        );
    }

    #[test]
    fn soft_delete_sets_the_configured_deleted_value() {
        let (rewriter, registry) = RewriteConfig::from_json(
            r#"{
                "tables": [{
                    "table": "sys_user",
                    "logic_delete": { "column": "state", "deleted_value": "gone", "not_deleted_value": "live" }
                }],
                "logic_delete": { "soft_delete": true }
            }"#,
        )
        .unwrap()
        .build()
        .unwrap();
        assert_eq!(
            rewriter
                .rewrite("DELETE FROM sys_user WHERE id = 3", &RewriteContext::new(&registry))
                .unwrap(),
            canonical("UPDATE sys_user SET state = 'gone' WHERE id = 3 AND state = 'live'")
        );
    }

    #[test]
    fn invalid_config_file_reports_its_path_once() {
        let path = std::env::temp_dir().join(format!("sqlrw-invalid-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "tenant": { "colum": "x" } }"#).unwrap();
        let error = RewriteConfig::from_path(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        let message = error.to_string();
        assert!(message.contains(&path.display().to_string()), "{message}");
        assert!(message.contains("colum"), "{message}");
        assert_eq!(message.matches("invalid rewrite configuration").count(), 1, "{message}");
    }
}
