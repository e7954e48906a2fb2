use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::property::property_name;
use crate::Value;

/// Column that marks a row as logically deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogicDeleteColumn {
    pub column: String,
    #[serde(default = "LogicDeleteColumn::default_deleted_value")]
    pub deleted_value: Value,
    #[serde(default = "LogicDeleteColumn::default_not_deleted_value")]
    pub not_deleted_value: Value,
}

impl LogicDeleteColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            deleted_value: Self::default_deleted_value(),
            not_deleted_value: Self::default_not_deleted_value(),
        }
    }

    fn default_deleted_value() -> Value {
        Value::Integer(1)
    }

    fn default_not_deleted_value() -> Value {
        Value::Integer(0)
    }
}

/// Mapping of one table: its property to column names and the columns that
/// carry cross-cutting concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableMetadata {
    pub table: String,
    /// property name -> column name, for properties whose column differs.
    #[serde(default)]
    pub columns: HashMap<String, String>,
    #[serde(default)]
    pub logic_delete: Option<LogicDeleteColumn>,
    #[serde(default)]
    pub tenant_column: Option<String>,
    #[serde(default)]
    pub ignore_tenant: bool,
    #[serde(default)]
    pub version_column: Option<String>,
}

impl TableMetadata {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: HashMap::new(),
            logic_delete: None,
            tenant_column: None,
            ignore_tenant: false,
            version_column: None,
        }
    }

    pub fn with_column(mut self, property: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(property.into(), column.into());
        self
    }

    pub fn with_logic_delete(mut self, logic_delete: LogicDeleteColumn) -> Self {
        self.logic_delete = Some(logic_delete);
        self
    }

    pub fn with_tenant_column(mut self, column: impl Into<String>) -> Self {
        self.tenant_column = Some(column.into());
        self
    }

    pub fn with_ignore_tenant(mut self) -> Self {
        self.ignore_tenant = true;
        self
    }

    pub fn with_version_column(mut self, column: impl Into<String>) -> Self {
        self.version_column = Some(column.into());
        self
    }

    /// Column for a property or accessor name. Unmapped properties use the
    /// property name itself.
    pub fn column_for(&self, property_or_accessor: &str) -> String {
        self.column_for_property(&property_name(property_or_accessor))
    }

    pub fn column_for_property(&self, property: &str) -> String {
        self.columns
            .get(property)
            .cloned()
            .unwrap_or_else(|| property.to_string())
    }
}

pub trait MetadataResolver: Send + Sync {
    fn resolve(&self, table: &str) -> Option<Arc<TableMetadata>>;
}

/// Resolver that knows no tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMetadata;

impl MetadataResolver for NoMetadata {
    fn resolve(&self, _table: &str) -> Option<Arc<TableMetadata>> {
        None
    }
}

/// Read-mostly registry keyed by lowercase table name. Readers receive `Arc`
/// snapshots; `register` swaps whole entries.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    tables: RwLock<HashMap<String, Arc<TableMetadata>>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, metadata: TableMetadata) -> Option<Arc<TableMetadata>> {
        let key = normalize_table_name(&metadata.table);
        self.tables.write().insert(key, Arc::new(metadata))
    }

    pub fn unregister(&self, table: &str) -> Option<Arc<TableMetadata>> {
        self.tables.write().remove(&normalize_table_name(table))
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names = self
            .tables
            .read()
            .values()
            .map(|metadata| metadata.table.clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

impl FromIterator<TableMetadata> for MetadataRegistry {
    fn from_iter<I: IntoIterator<Item = TableMetadata>>(iter: I) -> Self {
        let registry = Self::new();
        for metadata in iter {
            registry.register(metadata);
        }
        registry
    }
}

impl MetadataResolver for MetadataRegistry {
    fn resolve(&self, table: &str) -> Option<Arc<TableMetadata>> {
        self.tables.read().get(&normalize_table_name(table)).cloned()
    }
}

impl<R: MetadataResolver + ?Sized> MetadataResolver for Arc<R> {
    fn resolve(&self, table: &str) -> Option<Arc<TableMetadata>> {
        (**self).resolve(table)
    }
}

// `schema.table` and quoted names resolve by their last, unquoted part.
fn normalize_table_name(table: &str) -> String {
    let last = table.rsplit('.').next().unwrap_or(table);
    last.trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
        .to_ascii_lowercase()
}
