use thiserror::Error;

use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// The SQL text could not be parsed. Carries the complete original text.
    #[error("failed to parse SQL: {message}\n error SQL: {sql}")]
    Syntax { sql: String, message: String },

    #[error("unsupported construct `{construct}` in: {fragment}")]
    UnsupportedConstruct { construct: String, fragment: String },

    #[error("no metadata registered for table `{table}` in: {fragment}")]
    MetadataResolution { table: String, fragment: String },

    #[error("rewrite context has no value for `{key}` required by: {fragment}")]
    MissingContextValue { key: String, fragment: String },

    #[error("pass `{pass}` broke an AST invariant: {message}")]
    Invariant { pass: String, message: String },

    #[error("invalid rewrite configuration: {0}")]
    Config(String),
}

impl RewriteError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax { .. } => ErrorCode::Syntax,
            Self::UnsupportedConstruct { .. } => ErrorCode::UnsupportedConstruct,
            Self::MetadataResolution { .. } => ErrorCode::MetadataResolution,
            Self::MissingContextValue { .. } => ErrorCode::MissingContextValue,
            Self::Invariant { .. } => ErrorCode::Invariant,
            Self::Config(_) => ErrorCode::Config,
        }
    }
}
