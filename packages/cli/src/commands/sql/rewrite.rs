use crate::app::AppContext;
use crate::cli::sql::{SqlOutputFormat, SqlRewriteArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{self, RewriteReport};
use sqlrw_engine::{MetadataRegistry, Page, RewriteContext, Value};
use std::io::Read;

pub fn run(context: &AppContext, args: SqlRewriteArgs) -> Result<(), CliError> {
    let sql = resolve_sql(&args)?;
    let (rewriter, registry) = config::load_config(context)?.build()?;
    let rewrite_context = build_context(&registry, &args)?;
    let info = rewriter.parse(&sql, &rewrite_context)?;
    let report = RewriteReport::new(&sql, info);

    match args.format {
        SqlOutputFormat::Text => output::print_rewrite_text(&report),
        SqlOutputFormat::Json => output::print_rewrite_json(&report),
        SqlOutputFormat::Table => output::print_rewrite_table(&report, rewriter.dialect())?,
    }

    Ok(())
}

fn resolve_sql(args: &SqlRewriteArgs) -> Result<String, CliError> {
    if args.sql == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|source| CliError::io("failed to read SQL from stdin", source))?;
        if input.trim().is_empty() {
            return Err(CliError::invalid_args("stdin SQL input is empty"));
        }
        return Ok(input);
    }

    Ok(args.sql.clone())
}

fn build_context<'a>(
    registry: &'a MetadataRegistry,
    args: &SqlRewriteArgs,
) -> Result<RewriteContext<'a>, CliError> {
    let mut context = RewriteContext::new(registry);
    if let Some(statement_id) = &args.statement_id {
        context = context.with_statement_id(statement_id.clone());
    }
    for raw in &args.values {
        let (key, value) = parse_value(raw)?;
        context = context.with_value(key, value);
    }
    if let Some(size) = args.size {
        context = context.with_page(Page::of(args.page.unwrap_or(1), size));
    }
    Ok(context)
}

fn parse_value(raw: &str) -> Result<(String, Value), CliError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(CliError::invalid_args(format!(
            "expected KEY=VALUE, got `{raw}`"
        )));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::invalid_args(format!("empty key in `{raw}`")));
    }
    Ok((key.to_string(), Value::parse_loose(value)))
}
