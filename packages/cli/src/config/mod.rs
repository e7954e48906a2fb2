use crate::app::AppContext;
use crate::error::CliError;
use sqlrw_engine::RewriteConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "sqlrw.json";

/// The config named on the command line, else `./sqlrw.json`, else an empty
/// config that rewrites nothing.
pub fn load_config(context: &AppContext) -> Result<RewriteConfig, CliError> {
    match resolve_config_path(context)? {
        Some(path) => {
            debug!(path = %path.display(), "loading rewrite config");
            Ok(RewriteConfig::from_path(&path)?)
        }
        None => {
            debug!("no rewrite config found; using defaults");
            Ok(RewriteConfig::default())
        }
    }
}

pub fn resolve_config_path(context: &AppContext) -> Result<Option<PathBuf>, CliError> {
    if let Some(path) = &context.config_path {
        if !path.exists() {
            return Err(CliError::invalid_args(format!(
                "config file does not exist: {}",
                path.display()
            )));
        }
        return Ok(Some(path.clone()));
    }

    let cwd =
        std::env::current_dir().map_err(|source| CliError::io("failed to read cwd", source))?;
    Ok(default_config_in(&cwd))
}

fn default_config_in(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}
