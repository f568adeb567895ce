use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use straddle_core::StrategyConfig;

/// Quantity per leg so that hitting the initial stop loses about `fixed_risk_per_trade`.
///
/// `risk_per_unit = combined_premium * initial_sl_pct`; the raw quantity
/// `budget / risk_per_unit` is rounded to the nearest whole lot (ties to even)
/// and never goes below one lot. A non-positive risk per unit sizes one lot.
#[must_use]
pub fn straddle_quantity(combined_premium: Decimal, config: &StrategyConfig) -> i64 {
    let lot = i64::from(config.lot_size);
    let risk_per_unit = combined_premium * config.initial_sl_pct;
    if risk_per_unit <= Decimal::ZERO {
        return lot;
    }

    let lots = (config.fixed_risk_per_trade / risk_per_unit / Decimal::from(lot)).round();
    let quantity = lots.to_i64().map_or(lot, |lots| lots.saturating_mul(lot));
    quantity.max(lot)
}
