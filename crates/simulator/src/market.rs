//! Synthetic index and option prices for one intraday session.
//!
//! Spot follows a bounded uniform random walk. Option premiums are intrinsic
//! value plus a time value that decays through the day and falls off with
//! distance from the strike, with a small per-quote noise term.

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use straddle_core::{MarketConfig, OptionKind, PriceSource};

use crate::session::SimulatedMarket;

/// Minutes from 09:15 to 15:30.
const SESSION_MINUTES: f64 = 375.0;
/// Stretch applied so time value is not fully gone at the close.
const DECAY_STRETCH: f64 = 1.5;
const DISTANCE_DECAY: f64 = 0.01;
const MIN_PREMIUM: f64 = 0.05;

pub struct SyntheticMarket {
    config: MarketConfig,
    open: NaiveDateTime,
    close: NaiveDateTime,
    now: NaiveDateTime,
    spot: f64,
    tick: u64,
    seed: u64,
    rng: ChaCha8Rng,
}

impl SyntheticMarket {
    /// Creates a market positioned at `market_open` on the configured trading date (today if unset).
    #[must_use]
    pub fn new(config: MarketConfig, market_open: NaiveTime) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let date = config
            .trading_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let open = date.and_time(market_open);
        let close = date.and_time(config.session_close);

        tracing::debug!(seed, %open, spot = config.initial_spot, "Synthetic market created");

        Self {
            spot: config.initial_spot,
            config,
            open,
            close,
            now: open,
            tick: 0,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.tick
    }

    fn elapsed_minutes(&self) -> f64 {
        (self.now - self.open).num_seconds() as f64 / 60.0
    }

    fn time_value(&self, strike: i64) -> f64 {
        let decay = (1.0 - self.elapsed_minutes() / (SESSION_MINUTES * DECAY_STRETCH)).max(0.0);
        let distance = (self.spot - strike as f64).abs();
        self.config.base_time_value * decay * (-DISTANCE_DECAY * distance).exp()
    }

    fn intrinsic(&self, strike: i64, kind: OptionKind) -> f64 {
        let strike = strike as f64;
        match kind {
            OptionKind::Call => (self.spot - strike).max(0.0),
            OptionKind::Put => (strike - self.spot).max(0.0),
        }
    }

    /// Noise for one quote, fixed for a given tick, strike and kind.
    fn quote_noise(&self, strike: i64, kind: OptionKind) -> f64 {
        if self.config.option_noise <= 0.0 {
            return 0.0;
        }
        let kind_tag: u64 = match kind {
            OptionKind::Call => 0x5a5a,
            OptionKind::Put => 0xa5a5,
        };
        let mixed = self.seed
            ^ self.tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (strike as u64).rotate_left(21)
            ^ kind_tag;
        let mut rng = ChaCha8Rng::seed_from_u64(mixed);
        rng.gen_range(-self.config.option_noise..=self.config.option_noise)
    }

    /// Premium before noise and flooring.
    #[must_use]
    pub fn fair_value(&self, strike: i64, kind: OptionKind) -> f64 {
        self.intrinsic(strike, kind) + self.time_value(strike)
    }
}

impl SimulatedMarket for SyntheticMarket {
    fn advance(&mut self) {
        self.now += Duration::seconds(i64::from(self.config.tick_seconds));
        self.tick += 1;
        let step = if self.config.volatility > 0.0 {
            self.rng
                .gen_range(-self.config.volatility..=self.config.volatility)
        } else {
            0.0
        };
        self.spot = (self.spot + step).max(1.0);
    }

    fn session_over(&self) -> bool {
        self.now >= self.close
    }
}

impl PriceSource for SyntheticMarket {
    fn current_time(&self) -> NaiveDateTime {
        self.now
    }

    fn spot_price(&self) -> Decimal {
        Decimal::from_f64(self.spot)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
    }

    fn option_quote(&self, strike: i64, kind: OptionKind) -> Decimal {
        let price = (self.fair_value(strike, kind) + self.quote_noise(strike, kind)).max(MIN_PREMIUM);
        Decimal::from_f64(price)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
    }

    fn at_the_money_strike(&self) -> i64 {
        let step = f64::from(self.config.strike_step);
        ((self.spot / step).round_ties_even() * step) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config(seed: u64) -> MarketConfig {
        MarketConfig {
            seed: Some(seed),
            trading_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..MarketConfig::default()
        }
    }

    fn open() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 15, 0).unwrap()
    }

    #[test]
    fn starts_at_market_open() {
        let market = SyntheticMarket::new(config(1), open());
        assert_eq!(market.current_time().time(), open());
        assert_eq!(market.current_time().date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(market.spot_price(), Decimal::from(19_500));
        assert_eq!(market.at_the_money_strike(), 19_500);
    }

    #[test]
    fn advance_moves_clock_by_one_tick() {
        let mut market = SyntheticMarket::new(config(1), open());
        market.advance();
        assert_eq!(market.current_time().time(), NaiveTime::from_hms_opt(9, 16, 0).unwrap());
        assert_eq!(market.ticks(), 1);
    }

    #[test]
    fn spot_step_is_bounded_by_volatility() {
        let mut market = SyntheticMarket::new(config(9), open());
        let mut last = market.spot;
        for _ in 0..200 {
            market.advance();
            assert!((market.spot - last).abs() <= market.config.volatility + 1e-9);
            last = market.spot;
        }
    }

    #[test]
    fn quotes_are_stable_within_a_tick() {
        let mut market = SyntheticMarket::new(config(3), open());
        market.advance();
        let first = market.option_quote(19_500, OptionKind::Call);
        let second = market.option_quote(19_500, OptionKind::Call);
        assert_eq!(first, second);
    }

    #[test]
    fn same_seed_same_path() {
        let mut a = SyntheticMarket::new(config(42), open());
        let mut b = SyntheticMarket::new(config(42), open());
        for _ in 0..30 {
            a.advance();
            b.advance();
        }
        assert_eq!(a.spot_price(), b.spot_price());
        assert_eq!(
            a.option_quote(19_500, OptionKind::Put),
            b.option_quote(19_500, OptionKind::Put)
        );
    }

    #[test]
    fn quotes_are_positive_and_priced_off_intrinsic() {
        let market = SyntheticMarket::new(config(5), open());
        // Deep in the money: roughly the intrinsic value
        let deep_call = market.option_quote(19_000, OptionKind::Call);
        assert!(deep_call >= Decimal::from(499));
        // Far out of the money: floored at the minimum premium
        let far_put = market.option_quote(18_000, OptionKind::Put);
        assert!(far_put >= Decimal::from_f64(MIN_PREMIUM).unwrap());
        assert!(far_put < Decimal::ONE);
    }

    #[test]
    fn time_value_decays_through_the_day() {
        let mut market = SyntheticMarket::new(
            MarketConfig {
                volatility: 0.0,
                option_noise: 0.0,
                ..config(1)
            },
            open(),
        );
        let morning = market.fair_value(19_500, OptionKind::Call);
        for _ in 0..300 {
            market.advance();
        }
        let afternoon = market.fair_value(19_500, OptionKind::Call);
        assert!(afternoon < morning);
        assert!(afternoon > 0.0);
    }

    #[test]
    fn atm_strike_rounds_to_step() {
        let mut market = SyntheticMarket::new(config(1), open());
        market.spot = 19_526.0;
        assert_eq!(market.at_the_money_strike(), 19_550);
        market.spot = 19_524.0;
        assert_eq!(market.at_the_money_strike(), 19_500);
    }

    #[test]
    fn atm_strike_ties_round_to_even_multiple() {
        let mut market = SyntheticMarket::new(config(1), open());
        market.spot = 19_525.0;
        assert_eq!(market.at_the_money_strike(), 19_500);
        market.spot = 19_575.0;
        assert_eq!(market.at_the_money_strike(), 19_600);
    }

    #[test]
    fn session_over_at_close() {
        let mut market = SyntheticMarket::new(config(1), open());
        assert!(!market.session_over());
        for _ in 0..375 {
            market.advance();
        }
        assert!(market.session_over());
    }

    #[test]
    fn day_long_tick_still_ends_the_session() {
        let mut market = SyntheticMarket::new(
            MarketConfig {
                tick_seconds: 86_400,
                ..config(1)
            },
            open(),
        );
        market.advance();
        assert_eq!(market.current_time().time(), open());
        assert!(market.session_over());
    }
}
