use std::fmt::{Display, Formatter};

use sqlrw_engine::RewriteError;

#[derive(Debug)]
pub enum CliError {
    InvalidArgs(String),
    Rewrite(RewriteError),
    Io {
        context: &'static str,
        source: std::io::Error,
    },
}

impl CliError {
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgs(message) => write!(f, "invalid arguments: {message}"),
            Self::Rewrite(error) => write!(f, "[{}] {error}", error.code().as_str()),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<RewriteError> for CliError {
    fn from(error: RewriteError) -> Self {
        Self::Rewrite(error)
    }
}
