use anyhow::Result;
use clap::Args;
use straddle_core::DEFAULT_CONFIG_PATH;

use super::load_config;

/// Arguments for the show-config command.
#[derive(Args, Debug, Clone)]
pub struct ShowConfigArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Profile merged over the base file (reads Straddle.<profile>.toml)
    #[arg(long)]
    pub profile: Option<String>,
}

/// Prints the merged configuration as JSON.
pub fn run_show_config(args: &ShowConfigArgs) -> Result<()> {
    let config = load_config(&args.config, args.profile.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
