use crate::events::OptionKind;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Read-only market view consumed by the strategy on every tick.
///
/// Implementations must return the same quote for repeated queries within one tick.
pub trait PriceSource {
    fn current_time(&self) -> NaiveDateTime;

    fn spot_price(&self) -> Decimal;

    /// Premium for the option at `strike`; never negative.
    fn option_quote(&self, strike: i64, kind: OptionKind) -> Decimal;

    /// Strike nearest to spot on the source's strike grid.
    fn at_the_money_strike(&self) -> i64;
}

impl<T: PriceSource + ?Sized> PriceSource for &T {
    fn current_time(&self) -> NaiveDateTime {
        (**self).current_time()
    }

    fn spot_price(&self) -> Decimal {
        (**self).spot_price()
    }

    fn option_quote(&self, strike: i64, kind: OptionKind) -> Decimal {
        (**self).option_quote(strike, kind)
    }

    fn at_the_money_strike(&self) -> i64 {
        (**self).at_the_money_strike()
    }
}
