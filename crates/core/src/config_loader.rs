use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/Straddle.toml";
const ENV_PREFIX: &str = "STRADDLE_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, the TOML file and `STRADDLE_` environment variables.
    ///
    /// A missing file is not an error; the defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the merged configuration is invalid.
    pub fn load(path: &str) -> Result<AppConfig> {
        Self::extract(Self::base(path))
    }

    /// Loads configuration with a profile file (`Straddle.<profile>.toml`) merged over the base file.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or the merged configuration is invalid.
    pub fn load_with_profile(path: &str, profile: &str) -> Result<AppConfig> {
        let figment = Self::base(path).merge(Toml::file(profile_path(path, profile)));
        Self::extract(figment)
    }

    fn base(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(path))
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;

        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

fn profile_path(path: &str, profile: &str) -> String {
    path.strip_suffix(".toml").map_or_else(
        || format!("{path}.{profile}"),
        |stem| format!("{stem}.{profile}.toml"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("config/Straddle.toml").unwrap();
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Straddle.toml",
                r#"
                [strategy]
                lot_size = 25
                fixed_risk_per_trade = 50000
                entry_time = "09:20"

                [market]
                seed = 7
                "#,
            )?;
            let config = ConfigLoader::load("Straddle.toml").unwrap();
            assert_eq!(config.strategy.lot_size, 25);
            assert_eq!(config.strategy.fixed_risk_per_trade, dec!(50000));
            assert_eq!(config.strategy.entry_time.to_string(), "09:20:00");
            assert_eq!(config.market.seed, Some(7));
            assert_eq!(config.strategy.index_symbol, "NIFTY");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("Straddle.toml", "[strategy]\nlot_size = 25\n")?;
            jail.set_env("STRADDLE_STRATEGY__LOT_SIZE", 75);
            let config = ConfigLoader::load("Straddle.toml").unwrap();
            assert_eq!(config.strategy.lot_size, 75);
            Ok(())
        });
    }

    #[test]
    fn profile_merges_over_base() {
        Jail::expect_with(|jail| {
            jail.create_file("Straddle.toml", "[strategy]\nlot_size = 25\n")?;
            jail.create_file("Straddle.banknifty.toml", "[strategy]\nindex_symbol = \"BANKNIFTY\"\nlot_size = 15\n")?;
            let config = ConfigLoader::load_with_profile("Straddle.toml", "banknifty").unwrap();
            assert_eq!(config.strategy.index_symbol, "BANKNIFTY");
            assert_eq!(config.strategy.lot_size, 15);
            Ok(())
        });
    }

    #[test]
    fn invalid_merged_config_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("Straddle.toml", "[strategy]\nexit_time = \"09:00\"\n")?;
            assert!(ConfigLoader::load("Straddle.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn non_finite_market_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("Straddle.toml", "[market]\noption_noise = nan\n")?;
            let err = ConfigLoader::load("Straddle.toml").unwrap_err();
            assert!(format!("{err:#}").contains("option_noise"));

            jail.create_file("Straddle.toml", "[market]\nvolatility = inf\n")?;
            assert!(ConfigLoader::load("Straddle.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn day_long_tick_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("Straddle.toml", "[market]\ntick_seconds = 86400\n")?;
            assert!(ConfigLoader::load("Straddle.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn profile_path_inserts_profile_before_extension() {
        assert_eq!(
            profile_path("config/Straddle.toml", "dev"),
            "config/Straddle.dev.toml"
        );
        assert_eq!(profile_path("straddle", "dev"), "straddle.dev");
    }
}
