use std::fmt;

use serde::Serialize;
use sqlparser::ast::{Delete, Insert, Query, Statement, Update};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
    Other,
}

impl StatementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Select => "select",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed statement, split by the kinds rewrite passes care about.
/// Everything else travels through untouched as `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlStatement {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Select(Box<Query>),
    Other(Statement),
}

impl SqlStatement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
            Self::Select(_) => StatementKind::Select,
            Self::Other(_) => StatementKind::Other,
        }
    }

    pub fn into_statement(self) -> Statement {
        match self {
            Self::Insert(insert) => Statement::Insert(insert),
            Self::Update(update) => Statement::Update(update),
            Self::Delete(delete) => Statement::Delete(delete),
            Self::Select(query) => Statement::Query(query),
            Self::Other(statement) => statement,
        }
    }

    pub fn to_sql(&self) -> String {
        self.clone().into_statement().to_string()
    }
}

impl From<Statement> for SqlStatement {
    fn from(statement: Statement) -> Self {
        match statement {
            Statement::Insert(insert) => Self::Insert(insert),
            Statement::Update(update) => Self::Update(update),
            Statement::Delete(delete) => Self::Delete(delete),
            Statement::Query(query) => Self::Select(query),
            other => Self::Other(other),
        }
    }
}

impl From<SqlStatement> for Statement {
    fn from(statement: SqlStatement) -> Self {
        statement.into_statement()
    }
}
