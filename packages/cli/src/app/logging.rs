use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "SQLRW_LOG";

/// Logs go to stderr so stdout carries only command output.
pub fn init() {
    let format = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .try_init();
}
