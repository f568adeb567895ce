use crate::events::{InstrumentSymbol, OrderSide, TradeRecord};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Net holding in one instrument. Positive quantity is long, negative is short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub symbol: InstrumentSymbol,
    pub quantity: i64,
    pub avg_price: Decimal,
}

impl Position {
    #[must_use]
    pub const fn is_long(&self) -> bool {
        self.quantity > 0
    }

    /// Mark-to-market profit against `price`.
    #[must_use]
    pub fn unrealized_at(&self, price: Decimal) -> Decimal {
        let size = Decimal::from(self.quantity.abs());
        if self.is_long() {
            (price - self.avg_price) * size
        } else {
            (self.avg_price - price) * size
        }
    }
}

/// Positions, realized `PnL` and the append-only trade log for one session.
#[derive(Debug, Default)]
pub struct Ledger {
    positions: HashMap<InstrumentSymbol, Position>,
    realized_pnl: Decimal,
    trades: Vec<TradeRecord>,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a fill to the position book and appends it to the trade log.
    ///
    /// Returns the `PnL` realized by this fill (zero when it only opens or adds).
    /// A fill larger than the opposite open position closes it and opens the
    /// remainder at `price`.
    ///
    /// # Panics
    ///
    /// Panics if `quantity` is not positive; callers size orders in whole lots.
    pub fn record_trade(
        &mut self,
        symbol: &InstrumentSymbol,
        quantity: i64,
        side: OrderSide,
        price: Decimal,
        timestamp: NaiveDateTime,
    ) -> Decimal {
        assert!(quantity > 0, "trade quantity must be positive, got {quantity}");

        let delta = side.sign() * quantity;
        let realized = match self.positions.get_mut(symbol) {
            None => {
                self.positions.insert(
                    symbol.clone(),
                    Position {
                        symbol: symbol.clone(),
                        quantity: delta,
                        avg_price: price,
                    },
                );
                Decimal::ZERO
            }

            // Opening side: volume-weighted average
            Some(pos) if pos.quantity.signum() == delta.signum() => {
                let total = pos.quantity + delta;
                let cost = pos.avg_price * Decimal::from(pos.quantity) + price * Decimal::from(delta);
                pos.avg_price = cost / Decimal::from(total);
                pos.quantity = total;
                Decimal::ZERO
            }

            // Reducing, closing or reversing
            Some(pos) => {
                let closing = pos.quantity.abs().min(delta.abs());
                let pnl = if pos.is_long() {
                    (price - pos.avg_price) * Decimal::from(closing)
                } else {
                    (pos.avg_price - price) * Decimal::from(closing)
                };

                let remaining = pos.quantity + delta;
                if remaining == 0 {
                    self.positions.remove(symbol);
                } else {
                    if remaining.signum() != pos.quantity.signum() {
                        pos.avg_price = price;
                    }
                    pos.quantity = remaining;
                }
                pnl
            }
        };

        self.realized_pnl += realized;

        let record = TradeRecord {
            timestamp,
            symbol: symbol.clone(),
            side,
            quantity,
            price,
            value: price * Decimal::from(quantity),
        };
        tracing::debug!(
            symbol = %record.symbol,
            side = %record.side,
            quantity,
            price = %price,
            realized = %realized,
            "Trade recorded"
        );
        self.trades.push(record);

        realized
    }

    /// Mark-to-market `PnL` of open positions; symbols missing from `prices` contribute zero.
    #[must_use]
    pub fn unrealized_pnl(&self, prices: &HashMap<InstrumentSymbol, Decimal>) -> Decimal {
        self.positions
            .values()
            .filter_map(|pos| prices.get(&pos.symbol).map(|price| pos.unrealized_at(*price)))
            .sum()
    }

    #[must_use]
    pub fn total_pnl(&self, prices: &HashMap<InstrumentSymbol, Decimal>) -> Decimal {
        self.realized_pnl + self.unrealized_pnl(prices)
    }

    #[must_use]
    pub const fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    #[must_use]
    pub fn position(&self, symbol: &InstrumentSymbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    #[must_use]
    pub const fn positions(&self) -> &HashMap<InstrumentSymbol, Position> {
        &self.positions
    }

    #[must_use]
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.positions.is_empty()
    }
}
