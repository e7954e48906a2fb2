use std::collections::BTreeMap;

use crate::metadata::{MetadataResolver, NoMetadata};
use crate::{Page, Value};

static NO_METADATA: NoMetadata = NoMetadata;

/// Everything a pass may consult while rewriting one SQL string. Owned by the
/// caller; the rewriter only reads it.
#[derive(Clone)]
pub struct RewriteContext<'a> {
    metadata: &'a dyn MetadataResolver,
    statement_id: Option<String>,
    values: BTreeMap<String, Value>,
    page: Option<Page>,
}

impl<'a> RewriteContext<'a> {
    pub fn new(metadata: &'a dyn MetadataResolver) -> Self {
        Self {
            metadata,
            statement_id: None,
            values: BTreeMap::new(),
            page: None,
        }
    }

    pub fn with_statement_id(mut self, statement_id: impl Into<String>) -> Self {
        self.statement_id = Some(statement_id.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn metadata(&self) -> &'a dyn MetadataResolver {
        self.metadata
    }

    pub fn statement_id(&self) -> Option<&str> {
        self.statement_id.as_deref()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }
}

impl Default for RewriteContext<'static> {
    fn default() -> Self {
        Self::new(&NO_METADATA)
    }
}

impl std::fmt::Debug for RewriteContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteContext")
            .field("statement_id", &self.statement_id)
            .field("values", &self.values)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}
