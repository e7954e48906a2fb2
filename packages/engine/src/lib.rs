mod config;
mod context;
mod error;
pub mod errors;
mod guard;
pub mod metadata;
pub mod passes;
pub mod property;
mod rewrite;
pub mod sql;
mod types;

pub use config::{
    AuditColumnConfig, LogicDeleteConfig, OptimisticLockConfig, PaginationConfig, RewriteConfig,
    TenantConfig,
};
pub use context::RewriteContext;
pub use error::RewriteError;
pub use errors::ErrorCode;
pub use guard::{AllowAll, Guard, IgnoreStatements};
pub use metadata::{
    LogicDeleteColumn, MetadataRegistry, MetadataResolver, NoMetadata, TableMetadata,
};
pub use property::{property_name, AccessorNames, PropertyResolver};
pub use rewrite::{RewritePass, SqlRewriter, SqlRewriterBuilder};
pub use sql::{parse_statements, SqlDialect, SqlInfo, SqlStatement, StatementKind};
pub use types::{Page, Value};
