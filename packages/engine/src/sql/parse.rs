use serde::{Deserialize, Serialize};
use sqlparser::ast::{Expr, Statement};
use sqlparser::dialect::{
    AnsiDialect, Dialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    SQLiteDialect,
};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;

use crate::errors::syntax_error;
use crate::RewriteError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Generic,
    MySql,
    PostgreSql,
    Sqlite,
    MsSql,
    Ansi,
}

impl SqlDialect {
    pub(crate) fn parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySql => Box::new(MySqlDialect {}),
            Self::PostgreSql => Box::new(PostgreSqlDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
            Self::MsSql => Box::new(MsSqlDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
        }
    }
}

/// Splits `sql` into its statements. Empty statements between or after `;`
/// are dropped; blank or comment-only input yields no statements.
pub fn parse_statements(sql: &str, dialect: SqlDialect) -> Result<Vec<Statement>, RewriteError> {
    let dialect = dialect.parser_dialect();
    Parser::parse_sql(dialect.as_ref(), sql).map_err(|error| syntax_error(sql, error))
}

/// Parses one standalone expression such as `CURRENT_TIMESTAMP` or
/// `status <> 'archived'`.
pub fn parse_expr(fragment: &str, dialect: SqlDialect) -> Result<Expr, RewriteError> {
    let dialect = dialect.parser_dialect();
    let mut parser = Parser::new(dialect.as_ref())
        .try_with_sql(fragment)
        .map_err(|error| syntax_error(fragment, error))?;
    let expr = parser
        .parse_expr()
        .map_err(|error| syntax_error(fragment, error))?;
    parser
        .expect_token(&Token::EOF)
        .map_err(|error| syntax_error(fragment, error))?;
    Ok(expr)
}
