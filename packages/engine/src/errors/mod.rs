use sqlparser::parser::ParserError;

use crate::RewriteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Syntax,
    UnsupportedConstruct,
    MetadataResolution,
    MissingContextValue,
    Invariant,
    Config,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "SQLRW_ERROR_SYNTAX",
            Self::UnsupportedConstruct => "SQLRW_ERROR_UNSUPPORTED_CONSTRUCT",
            Self::MetadataResolution => "SQLRW_ERROR_METADATA_RESOLUTION",
            Self::MissingContextValue => "SQLRW_ERROR_MISSING_CONTEXT_VALUE",
            Self::Invariant => "SQLRW_ERROR_INVARIANT",
            Self::Config => "SQLRW_ERROR_CONFIG",
        }
    }

    pub const fn all() -> &'static [Self] {
        &[
            Self::Syntax,
            Self::UnsupportedConstruct,
            Self::MetadataResolution,
            Self::MissingContextValue,
            Self::Invariant,
            Self::Config,
        ]
    }
}

pub(crate) fn syntax_error(sql: &str, error: ParserError) -> RewriteError {
    RewriteError::Syntax {
        sql: sql.to_string(),
        message: error.to_string(),
    }
}

pub(crate) fn unsupported_construct_error(
    construct: impl Into<String>,
    fragment: impl ToString,
) -> RewriteError {
    RewriteError::UnsupportedConstruct {
        construct: construct.into(),
        fragment: fragment.to_string(),
    }
}

pub(crate) fn metadata_not_found_error(table: &str, fragment: impl ToString) -> RewriteError {
    RewriteError::MetadataResolution {
        table: table.to_string(),
        fragment: fragment.to_string(),
    }
}

pub(crate) fn missing_context_value_error(key: &str, fragment: impl ToString) -> RewriteError {
    RewriteError::MissingContextValue {
        key: key.to_string(),
        fragment: fragment.to_string(),
    }
}

pub(crate) fn invariant_error(pass: &str, message: impl Into<String>) -> RewriteError {
    RewriteError::Invariant {
        pass: pass.to_string(),
        message: message.into(),
    }
}

pub(crate) fn config_error(message: impl Into<String>) -> RewriteError {
    RewriteError::Config(message.into())
}
