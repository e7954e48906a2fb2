mod logging;
mod run;

use std::path::PathBuf;

pub use run::run;

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub config_path: Option<PathBuf>,
}
