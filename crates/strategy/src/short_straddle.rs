//! Intraday short straddle: sell the ATM call and put once, then manage the
//! combined premium with a fixed stop, a target, a trailing stop and a time exit.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use straddle_core::time::is_at_or_after;
use straddle_core::{InstrumentSymbol, Ledger, OptionKind, OrderSide, PriceSource, StrategyConfig};

use crate::error::EntryError;
use crate::sizing::straddle_quantity;
use crate::stops::{self, Bracket};
use crate::types::{ExitReason, JournalEntry, StatusSnapshot, StrategyState};

/// The sold straddle. Exists from entry onwards, including after exit.
#[derive(Debug, Clone, Serialize)]
pub struct OpenStraddle {
    pub strike: i64,
    /// Units per leg, a whole number of lots.
    pub quantity: i64,
    pub call: InstrumentSymbol,
    pub put: InstrumentSymbol,
    pub bracket: Bracket,
}

#[derive(Debug, Clone, Copy)]
struct LegQuotes {
    call: Decimal,
    put: Decimal,
}

impl LegQuotes {
    fn fetch<P: PriceSource + ?Sized>(source: &P, strike: i64) -> Self {
        Self {
            call: source.option_quote(strike, OptionKind::Call),
            put: source.option_quote(strike, OptionKind::Put),
        }
    }

    fn combined(self) -> Decimal {
        self.call + self.put
    }
}

/// What the monitor decided on one tick.
enum Decision {
    Exit(ExitReason),
    TrailingActivated(Decimal),
    TrailingTightened(Decimal),
    Hold,
}

/// Single-session state machine: `Waiting -> Active -> Exited`, or `Waiting -> Exited`.
///
/// Owns the ledger it trades against, so one `tick` is the whole unit of mutation.
#[derive(Debug)]
pub struct ShortStraddle {
    config: StrategyConfig,
    state: StrategyState,
    straddle: Option<OpenStraddle>,
    exit_reason: Option<ExitReason>,
    ledger: Ledger,
    journal: Vec<JournalEntry>,
}

impl ShortStraddle {
    #[must_use]
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            state: StrategyState::Waiting,
            straddle: None,
            exit_reason: None,
            ledger: Ledger::new(),
            journal: Vec::new(),
        }
    }

    /// Processes one clock step and returns the resulting state.
    pub fn tick<P: PriceSource + ?Sized>(&mut self, source: &P) -> StrategyState {
        match self.state {
            StrategyState::Waiting => self.on_waiting(source),
            StrategyState::Active => self.monitor(source),
            StrategyState::Exited => {}
        }
        self.state
    }

    fn on_waiting<P: PriceSource + ?Sized>(&mut self, source: &P) {
        let now = source.current_time();

        if is_at_or_after(now, self.config.exit_time) {
            info!(time = %now, "Exit time reached before entry, closing session");
            self.note(now, "Exit time reached without an entry".to_string());
            self.exit_reason = Some(ExitReason::EntryWindowClosed);
            self.state = StrategyState::Exited;
            return;
        }

        if !is_at_or_after(now, self.config.entry_time) {
            return;
        }

        if let Err(e) = self.enter(source) {
            warn!(time = %now, error = %e, "Entry deferred");
            self.note(now, format!("Entry deferred: {e}"));
        }
    }

    fn enter<P: PriceSource + ?Sized>(&mut self, source: &P) -> Result<(), EntryError> {
        let now = source.current_time();
        let strike = source.at_the_money_strike();
        let quotes = LegQuotes::fetch(source, strike);

        if quotes.call <= Decimal::ZERO || quotes.put <= Decimal::ZERO {
            return Err(EntryError::InvalidQuote {
                strike,
                call: quotes.call,
                put: quotes.put,
            });
        }

        let combined = quotes.combined();
        let quantity = straddle_quantity(combined, &self.config);
        let bracket = Bracket::open(combined, &self.config);
        let call = InstrumentSymbol::option(&self.config.index_symbol, strike, OptionKind::Call);
        let put = InstrumentSymbol::option(&self.config.index_symbol, strike, OptionKind::Put);

        self.ledger
            .record_trade(&call, quantity, OrderSide::Sell, quotes.call, now);
        self.ledger
            .record_trade(&put, quantity, OrderSide::Sell, quotes.put, now);

        info!(
            time = %now,
            spot = %source.spot_price(),
            strike,
            quantity,
            combined = %combined,
            stop_loss = %bracket.stop_loss,
            target = %bracket.target,
            "Straddle sold"
        );
        self.note(
            now,
            format!(
                "Sold {quantity} x {strike} straddle at {combined:.2} (CE {}, PE {}); SL {:.2}, target {:.2}",
                quotes.call, quotes.put, bracket.stop_loss, bracket.target
            ),
        );

        self.straddle = Some(OpenStraddle {
            strike,
            quantity,
            call,
            put,
            bracket,
        });
        self.state = StrategyState::Active;
        Ok(())
    }

    fn monitor<P: PriceSource + ?Sized>(&mut self, source: &P) {
        let now = source.current_time();
        let Some(straddle) = self.straddle.as_mut() else {
            return;
        };

        let quotes = LegQuotes::fetch(source, straddle.strike);
        let current = quotes.combined();
        let bracket = &mut straddle.bracket;
        bracket.observe(current);

        let decision = if let Some(reason) = stops::check_exit_rules(current, bracket) {
            Decision::Exit(reason)
        } else if is_at_or_after(now, self.config.exit_time) {
            Decision::Exit(ExitReason::TimeBasedExit)
        } else {
            match stops::trailing_stop_candidate(current, bracket, &self.config) {
                Some(candidate) => {
                    if bracket.tighten(candidate) {
                        Decision::TrailingActivated(candidate)
                    } else {
                        Decision::TrailingTightened(candidate)
                    }
                }
                None => Decision::Hold,
            }
        };

        debug!(time = %now, current = %current, stop_loss = %bracket.stop_loss, "Straddle monitored");

        match decision {
            Decision::Exit(reason) => self.exit(source, reason, Some(quotes)),
            Decision::TrailingActivated(stop) => {
                info!(time = %now, current = %current, stop_loss = %stop, "Trailing stop activated");
                self.note(now, format!("Trailing stop activated, SL moved to {stop:.2}"));
            }
            Decision::TrailingTightened(stop) => {
                debug!(time = %now, stop_loss = %stop, "Trailing stop tightened");
            }
            Decision::Hold => {}
        }
    }

    fn exit<P: PriceSource + ?Sized>(
        &mut self,
        source: &P,
        reason: ExitReason,
        quotes: Option<LegQuotes>,
    ) {
        let now = source.current_time();
        let Some(straddle) = self.straddle.as_ref() else {
            return;
        };
        let quotes = quotes.unwrap_or_else(|| LegQuotes::fetch(source, straddle.strike));

        self.ledger
            .record_trade(&straddle.call, straddle.quantity, OrderSide::Buy, quotes.call, now);
        self.ledger
            .record_trade(&straddle.put, straddle.quantity, OrderSide::Buy, quotes.put, now);

        info!(
            time = %now,
            %reason,
            combined = %quotes.combined(),
            realized = %self.ledger.realized_pnl(),
            "Straddle closed"
        );
        let message = format!(
            "Exit: {reason} (CE {}, PE {}), realized {:.2}",
            quotes.call,
            quotes.put,
            self.ledger.realized_pnl()
        );
        self.note(now, message);

        self.exit_reason = Some(reason);
        self.state = StrategyState::Exited;
    }

    fn note(&mut self, timestamp: NaiveDateTime, message: String) {
        self.journal.push(JournalEntry { timestamp, message });
    }

    /// Current quotes for both legs, keyed by symbol. Empty before entry.
    #[must_use]
    pub fn leg_prices<P: PriceSource + ?Sized>(&self, source: &P) -> HashMap<InstrumentSymbol, Decimal> {
        self.straddle.as_ref().map_or_else(HashMap::new, |straddle| {
            let quotes = LegQuotes::fetch(source, straddle.strike);
            HashMap::from([
                (straddle.call.clone(), quotes.call),
                (straddle.put.clone(), quotes.put),
            ])
        })
    }

    /// Realized plus mark-to-market `PnL` at the source's current quotes.
    #[must_use]
    pub fn total_pnl<P: PriceSource + ?Sized>(&self, source: &P) -> Decimal {
        self.ledger.total_pnl(&self.leg_prices(source))
    }

    #[must_use]
    pub fn status<P: PriceSource + ?Sized>(&self, source: &P) -> StatusSnapshot {
        let prices = self.leg_prices(source);
        let current_combined_premium = prices.values().copied().sum();
        let unrealized_pnl = self.ledger.unrealized_pnl(&prices);
        let realized_pnl = self.ledger.realized_pnl();
        let bracket = self.straddle.as_ref().map(|s| &s.bracket);

        StatusSnapshot {
            timestamp: source.current_time(),
            state: self.state,
            entry_strike: self.entry_strike(),
            quantity: self.quantity(),
            current_combined_premium,
            entry_combined_premium: bracket.map_or(Decimal::ZERO, |b| b.entry_premium),
            stop_loss: bracket.map_or(Decimal::ZERO, |b| b.stop_loss),
            target: bracket.map_or(Decimal::ZERO, |b| b.target),
            lowest_premium: bracket.map_or(Decimal::ZERO, |b| b.lowest_premium),
            trailing_active: self.trailing_active(),
            exit_reason: self.exit_reason,
            realized_pnl,
            unrealized_pnl,
            total_pnl: realized_pnl + unrealized_pnl,
            trades: self.ledger.trades().to_vec(),
            journal: self.journal.clone(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> StrategyState {
        self.state
    }

    #[must_use]
    pub const fn exit_reason(&self) -> Option<ExitReason> {
        self.exit_reason
    }

    #[must_use]
    pub const fn straddle(&self) -> Option<&OpenStraddle> {
        self.straddle.as_ref()
    }

    #[must_use]
    pub fn entry_strike(&self) -> Option<i64> {
        self.straddle.as_ref().map(|s| s.strike)
    }

    /// Units per leg; zero before entry.
    #[must_use]
    pub fn quantity(&self) -> i64 {
        self.straddle.as_ref().map_or(0, |s| s.quantity)
    }

    #[must_use]
    pub fn stop_loss(&self) -> Option<Decimal> {
        self.straddle.as_ref().map(|s| s.bracket.stop_loss)
    }

    #[must_use]
    pub fn target(&self) -> Option<Decimal> {
        self.straddle.as_ref().map(|s| s.bracket.target)
    }

    #[must_use]
    pub fn trailing_active(&self) -> bool {
        self.straddle
            .as_ref()
            .is_some_and(|s| s.bracket.trailing_active)
    }

    #[must_use]
    pub fn leg_symbols(&self) -> Option<(&InstrumentSymbol, &InstrumentSymbol)> {
        self.straddle.as_ref().map(|s| (&s.call, &s.put))
    }

    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }
}
