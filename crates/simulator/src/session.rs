//! Tick driver: advances the market, then runs the engine exactly once per step.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use straddle_core::PriceSource;
use straddle_strategy::{ShortStraddle, StatusSnapshot, StrategyState};

/// A price source the driver can move forward between engine ticks.
pub trait SimulatedMarket: PriceSource {
    /// Moves simulated time and prices one step forward.
    fn advance(&mut self);

    /// True once the clock has reached the end of the trading session.
    fn session_over(&self) -> bool;
}

/// Mark-to-market sample taken after each tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PnlPoint {
    pub timestamp: NaiveDateTime,
    pub spot: Decimal,
    pub total_pnl: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub status: StatusSnapshot,
    pub history: Vec<PnlPoint>,
    pub ticks: usize,
    /// Largest peak-to-trough fall of total `PnL`, in currency.
    pub max_drawdown: Decimal,
    /// Final total `PnL` over total capital.
    pub return_on_capital: Decimal,
}

pub struct Session<M> {
    market: M,
    engine: ShortStraddle,
    history: Vec<PnlPoint>,
    ticks: usize,
}

impl<M: SimulatedMarket> Session<M> {
    #[must_use]
    pub const fn new(market: M, engine: ShortStraddle) -> Self {
        Self {
            market,
            engine,
            history: Vec::new(),
            ticks: 0,
        }
    }

    /// Advances the market and ticks the engine once.
    pub fn step(&mut self) -> StrategyState {
        self.market.advance();
        let state = self.engine.tick(&self.market);
        self.ticks += 1;

        let point = PnlPoint {
            timestamp: self.market.current_time(),
            spot: self.market.spot_price(),
            total_pnl: self.engine.total_pnl(&self.market),
        };
        tracing::trace!(time = %point.timestamp, spot = %point.spot, pnl = %point.total_pnl, %state, "Tick");
        self.history.push(point);

        state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.engine.state() == StrategyState::Exited || self.market.session_over()
    }

    /// Steps until the engine exits or the session closes.
    pub fn run(&mut self) -> SessionSummary {
        while !self.is_finished() {
            self.step();
        }
        self.summary()
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let status = self.engine.status(&self.market);
        let capital = self.engine.config().total_capital;
        let return_on_capital = if capital.is_zero() {
            Decimal::ZERO
        } else {
            status.total_pnl / capital
        };

        SessionSummary {
            max_drawdown: max_drawdown(&self.history),
            return_on_capital,
            ticks: self.ticks,
            history: self.history.clone(),
            status,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        self.engine.status(&self.market)
    }

    #[must_use]
    pub const fn market(&self) -> &M {
        &self.market
    }

    #[must_use]
    pub const fn engine(&self) -> &ShortStraddle {
        &self.engine
    }

    #[must_use]
    pub fn history(&self) -> &[PnlPoint] {
        &self.history
    }
}

/// Largest drop from a running peak of the `PnL` curve. The curve starts at zero.
#[must_use]
pub fn max_drawdown(history: &[PnlPoint]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;
    for point in history {
        peak = peak.max(point.total_pnl);
        worst = worst.max(peak - point.total_pnl);
    }
    worst
}
