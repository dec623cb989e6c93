// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration lookup for the analysis core

pub mod analysis_config;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::env_config;

pub use analysis_config::{
    AnalysisConfig, ComplianceConfig, FatigueConfig, GradeThresholds, GradingConfig,
    TelemetryConfig,
};

/// Load the analysis configuration
///
/// Lookup order: `path`, then `RUNFORM_CONFIG`, then `runform.toml` in the working
/// directory, then `<config dir>/runform/config.toml`. Without any file the
/// built-in defaults are used.
pub fn load(path: Option<&Path>) -> Result<AnalysisConfig> {
    dotenv::dotenv().ok();

    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| env_config::config_path().map(PathBuf::from));

    if let Some(config_path) = explicit {
        info!(path = %config_path.display(), "Loading analysis config");
        return AnalysisConfig::load_from_file(&config_path);
    }

    match discover_config_file() {
        Some(found) => {
            info!(path = %found.display(), "Loading analysis config");
            AnalysisConfig::load_from_file(&found)
        }
        None => {
            debug!("No analysis config file found, using defaults");
            Ok(AnalysisConfig::default())
        }
    }
}

fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(env_config::LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env_config::CONFIG_DIR_NAME).join("config.toml"))
        .filter(|p| p.exists())
}
