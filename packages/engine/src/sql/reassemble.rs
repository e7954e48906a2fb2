use serde::Serialize;

use super::statement::StatementKind;

pub(crate) const STATEMENT_SEPARATOR: char = ';';

/// The rewritten SQL handed back to the caller. Only ever built from a fully
/// assembled buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlInfo {
    sql: String,
    kinds: Vec<StatementKind>,
}

impl SqlInfo {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Kinds of the statements that contributed to `sql`, in order.
    pub fn kinds(&self) -> &[StatementKind] {
        &self.kinds
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

/// Joins serialized statements with a single `;`, skipping empty ones.
/// `None` when nothing is left.
pub fn join_statements<I, S>(statements: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buffer = String::new();
    let mut joined = 0usize;
    for statement in statements {
        let statement = statement.as_ref();
        if statement.trim().is_empty() {
            continue;
        }
        if joined > 0 {
            buffer.push(STATEMENT_SEPARATOR);
        }
        buffer.push_str(statement);
        joined += 1;
    }
    (joined > 0).then_some(buffer)
}

pub(crate) fn assemble(statements: Vec<(StatementKind, String)>) -> Option<SqlInfo> {
    let mut kinds = Vec::with_capacity(statements.len());
    let mut texts = Vec::with_capacity(statements.len());
    for (kind, text) in statements {
        if text.trim().is_empty() {
            continue;
        }
        kinds.push(kind);
        texts.push(text);
    }
    let sql = join_statements(texts)?;
    Some(SqlInfo { sql, kinds })
}
