//! Stop-loss, target and trailing-stop rules for a short premium position.
//!
//! The position profits as the combined premium falls, so the stop sits above
//! the entry premium and the target below it.

use rust_decimal::Decimal;
use serde::Serialize;
use straddle_core::StrategyConfig;

use crate::types::ExitReason;

/// Risk levels of an open straddle, all in combined-premium units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub entry_premium: Decimal,
    pub stop_loss: Decimal,
    pub target: Decimal,
    /// Lowest combined premium observed since entry.
    pub lowest_premium: Decimal,
    pub trailing_active: bool,
}

impl Bracket {
    #[must_use]
    pub fn open(entry_premium: Decimal, config: &StrategyConfig) -> Self {
        Self {
            entry_premium,
            stop_loss: entry_premium * (Decimal::ONE + config.initial_sl_pct),
            target: entry_premium * (Decimal::ONE - config.target_pct),
            lowest_premium: entry_premium,
            trailing_active: false,
        }
    }

    pub fn observe(&mut self, current: Decimal) {
        self.lowest_premium = self.lowest_premium.min(current);
    }

    /// Fraction of the entry premium already captured.
    #[must_use]
    pub fn profit_fraction(&self, current: Decimal) -> Decimal {
        if self.entry_premium <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.entry_premium - current) / self.entry_premium
    }

    /// Moves the stop to `candidate`; only ever tightens.
    ///
    /// Returns true the first time the trailing stop becomes active.
    pub fn tighten(&mut self, candidate: Decimal) -> bool {
        if candidate >= self.stop_loss {
            return false;
        }
        self.stop_loss = candidate;
        let first = !self.trailing_active;
        self.trailing_active = true;
        first
    }
}

/// Stop first, then target. Returns the exit reason if either is breached.
#[must_use]
pub fn check_exit_rules(current: Decimal, bracket: &Bracket) -> Option<ExitReason> {
    check_stop_loss(current, bracket).or_else(|| check_target(current, bracket))
}

#[must_use]
pub fn check_stop_loss(current: Decimal, bracket: &Bracket) -> Option<ExitReason> {
    if current < bracket.stop_loss {
        return None;
    }
    tracing::warn!(
        current = %current,
        stop_loss = %bracket.stop_loss,
        trailing = bracket.trailing_active,
        "Stop loss breached"
    );
    Some(if bracket.trailing_active {
        ExitReason::TrailingStopHit
    } else {
        ExitReason::StopLossHit
    })
}

#[must_use]
pub fn check_target(current: Decimal, bracket: &Bracket) -> Option<ExitReason> {
    if current > bracket.target {
        return None;
    }
    tracing::info!(current = %current, target = %bracket.target, "Target reached");
    Some(ExitReason::TargetHit)
}

/// Tighter stop proposed by the trailing rule, if the position is far enough
/// in profit and the trail would sit below the current stop.
#[must_use]
pub fn trailing_stop_candidate(
    current: Decimal,
    bracket: &Bracket,
    config: &StrategyConfig,
) -> Option<Decimal> {
    if bracket.profit_fraction(current) < config.trailing_activation_pct {
        return None;
    }
    let candidate = bracket.lowest_premium * (Decimal::ONE + config.trailing_sl_pct);
    (candidate < bracket.stop_loss).then_some(candidate)
}
