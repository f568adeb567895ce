//! CLI commands for the straddle simulator.

pub mod run;
pub mod show_config;

pub use run::{run_session, RunArgs};
pub use show_config::{run_show_config, ShowConfigArgs};

use anyhow::Result;
use straddle_core::{AppConfig, ConfigLoader};

/// Loads the configuration, merging the profile file when one is given.
pub(crate) fn load_config(path: &str, profile: Option<&str>) -> Result<AppConfig> {
    profile.map_or_else(
        || ConfigLoader::load(path),
        |profile| ConfigLoader::load_with_profile(path, profile),
    )
}
