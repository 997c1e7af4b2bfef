//! Command implementations.

mod info;
mod run;
mod sample;
mod validate;

pub use info::run_info;
pub use run::run_publisher;
pub use sample::run_sample;
pub use validate::run_validate;

use std::path::Path;

use contracts::PublisherBlueprint;

use crate::error::{CliError, Result};

/// Load and validate a blueprint, failing early on a missing file
pub(crate) fn load_blueprint(path: &Path) -> Result<PublisherBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
