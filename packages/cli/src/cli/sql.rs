use clap::{Args, Subcommand, ValueEnum};

#[derive(Debug, Args)]
pub struct SqlCommand {
    #[command(subcommand)]
    pub command: SqlSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum SqlSubcommand {
    /// Rewrite SQL text. Use '-' to read SQL from stdin.
    Rewrite(SqlRewriteArgs),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SqlOutputFormat {
    Text,
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct SqlRewriteArgs {
    /// Output format for the rewritten SQL.
    #[arg(long, value_enum, default_value_t = SqlOutputFormat::Text)]
    pub format: SqlOutputFormat,

    /// Statement id checked against the config's ignore list.
    #[arg(long)]
    pub statement_id: Option<String>,

    /// Context value as key=value, e.g. --value tenant_id=4. Repeatable.
    #[arg(long = "value", value_name = "KEY=VALUE")]
    pub values: Vec<String>,

    /// One-based page number.
    #[arg(long, requires = "size")]
    pub page: Option<u64>,

    /// Page size.
    #[arg(long)]
    pub size: Option<u64>,

    /// SQL text to rewrite. Use '-' to read from stdin.
    pub sql: String,
}
