use super::sql::SqlCommand;
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sqlrw")]
#[command(about = "Rewrite SQL with logical delete, tenant, locking, audit and paging rules")]
pub struct Cli {
    /// Path to the rewrite config (defaults to ./sqlrw.json when present).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work with SQL text.
    Sql(SqlCommand),
}
