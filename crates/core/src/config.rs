use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time::hhmm;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub strategy: StrategyConfig,
    pub market: MarketConfig,
}

/// Session constants for the short straddle. Immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub total_capital: Decimal,
    /// Maximum loss budgeted for one straddle if the initial stop is hit.
    pub fixed_risk_per_trade: Decimal,
    pub lot_size: u32,
    pub index_symbol: String,
    #[serde(with = "hhmm")]
    pub market_open: NaiveTime,
    #[serde(with = "hhmm")]
    pub entry_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub exit_time: NaiveTime,
    /// Initial stop distance as a fraction of the combined premium.
    pub initial_sl_pct: Decimal,
    pub target_pct: Decimal,
    /// Profit fraction at which the trailing stop starts to ratchet.
    pub trailing_activation_pct: Decimal,
    /// Trail distance above the lowest observed premium.
    pub trailing_sl_pct: Decimal,
}

/// Parameters of the synthetic price generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub initial_spot: f64,
    /// Maximum absolute spot move per tick.
    pub volatility: f64,
    pub strike_step: u32,
    pub tick_seconds: u32,
    #[serde(with = "hhmm")]
    pub session_close: NaiveTime,
    pub base_time_value: f64,
    pub option_noise: f64,
    pub seed: Option<u64>,
    pub trading_date: Option<NaiveDate>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            total_capital: Decimal::from(1_000_000),
            fixed_risk_per_trade: Decimal::from(5_000),
            lot_size: 50,
            index_symbol: "NIFTY".to_string(),
            market_open: clock(9, 15),
            entry_time: clock(9, 17),
            exit_time: clock(15, 0),
            initial_sl_pct: Decimal::new(10, 2),
            target_pct: Decimal::new(10, 2),
            trailing_activation_pct: Decimal::new(25, 3),
            trailing_sl_pct: Decimal::new(25, 3),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_spot: 19_500.0,
            volatility: 2.0,
            strike_step: 50,
            tick_seconds: 60,
            session_close: clock(15, 30),
            base_time_value: 100.0,
            option_noise: 0.5,
            seed: None,
            trading_date: None,
        }
    }
}

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl StrategyConfig {
    /// Checks the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.lot_size == 0 {
            bail!("lot_size must be positive");
        }
        if self.total_capital <= Decimal::ZERO {
            bail!("total_capital must be positive");
        }
        if self.fixed_risk_per_trade <= Decimal::ZERO {
            bail!("fixed_risk_per_trade must be positive");
        }
        if self.index_symbol.trim().is_empty() {
            bail!("index_symbol must not be empty");
        }
        for (name, value) in [
            ("initial_sl_pct", self.initial_sl_pct),
            ("target_pct", self.target_pct),
            ("trailing_activation_pct", self.trailing_activation_pct),
            ("trailing_sl_pct", self.trailing_sl_pct),
        ] {
            if value < Decimal::ZERO || value >= Decimal::ONE {
                bail!("{name} must be in [0, 1), got {value}");
            }
        }
        if self.entry_time < self.market_open {
            bail!(
                "entry_time {} is before market_open {}",
                self.entry_time,
                self.market_open
            );
        }
        if self.entry_time >= self.exit_time {
            bail!(
                "entry_time {} must be before exit_time {}",
                self.entry_time,
                self.exit_time
            );
        }
        Ok(())
    }
}

impl AppConfig {
    /// Validates the strategy section and its consistency with the market.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        if self.market.strike_step == 0 {
            bail!("market.strike_step must be positive");
        }
        for (name, value) in [
            ("initial_spot", self.market.initial_spot),
            ("volatility", self.market.volatility),
            ("base_time_value", self.market.base_time_value),
            ("option_noise", self.market.option_noise),
        ] {
            if !value.is_finite() {
                bail!("market.{name} must be a finite number, got {value}");
            }
            if value < 0.0 {
                bail!("market.{name} must not be negative, got {value}");
            }
        }
        if self.market.initial_spot <= 0.0 {
            bail!("market.initial_spot must be positive");
        }
        if self.market.session_close < self.strategy.exit_time {
            bail!(
                "market.session_close {} is before strategy exit_time {}",
                self.market.session_close,
                self.strategy.exit_time
            );
        }
        let session_seconds = (self.market.session_close - self.strategy.market_open).num_seconds();
        if self.market.tick_seconds == 0 || i64::from(self.market.tick_seconds) > session_seconds {
            bail!(
                "market.tick_seconds must be between 1 and the session length ({session_seconds}s), got {}",
                self.market.tick_seconds
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn default_strategy_constants() {
        let config = StrategyConfig::default();
        assert_eq!(config.fixed_risk_per_trade, dec!(5000));
        assert_eq!(config.initial_sl_pct, dec!(0.10));
        assert_eq!(config.trailing_activation_pct, dec!(0.025));
        assert_eq!(config.entry_time, clock(9, 17));
        assert_eq!(config.exit_time, clock(15, 0));
    }

    #[test]
    fn rejects_zero_lot_size() {
        let config = StrategyConfig {
            lot_size: 0,
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        let config = StrategyConfig {
            target_pct: dec!(1.5),
            ..StrategyConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("target_pct"));
    }

    #[test]
    fn rejects_entry_after_exit() {
        let config = StrategyConfig {
            entry_time: clock(15, 10),
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_session_close_before_exit() {
        let mut config = AppConfig::default();
        config.market.session_close = clock(14, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tick_longer_than_session() {
        let mut config = AppConfig::default();
        config.market.tick_seconds = 86_400;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("tick_seconds"));

        // 09:15 to 15:30 is 22_500 seconds
        config.market.tick_seconds = 22_500;
        config.validate().unwrap();
        config.market.tick_seconds = 22_501;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_tick() {
        let mut config = AppConfig::default();
        config.market.tick_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_market_numbers() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut config = AppConfig::default();
            config.market.option_noise = value;
            assert!(config.validate().is_err(), "option_noise = {value}");

            let mut config = AppConfig::default();
            config.market.volatility = value;
            assert!(config.validate().is_err(), "volatility = {value}");

            let mut config = AppConfig::default();
            config.market.initial_spot = value;
            assert!(config.validate().is_err(), "initial_spot = {value}");

            let mut config = AppConfig::default();
            config.market.base_time_value = value;
            assert!(config.validate().is_err(), "base_time_value = {value}");
        }
    }

    #[test]
    fn rejects_negative_base_time_value() {
        let mut config = AppConfig::default();
        config.market.base_time_value = -1.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("base_time_value"));
    }

    #[test]
    fn clock_fields_serialize_as_hhmm() {
        let json = serde_json::to_value(StrategyConfig::default()).unwrap();
        assert_eq!(json["entry_time"], "09:17");
        assert_eq!(json["exit_time"], "15:00");
    }
}
