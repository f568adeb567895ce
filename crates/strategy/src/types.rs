//! Types for the short straddle engine.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use straddle_core::TradeRecord;

/// Lifecycle of one trading session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyState {
    Waiting,
    Active,
    Exited,
}

impl std::fmt::Display for StrategyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Exited => write!(f, "EXITED"),
        }
    }
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    StopLossHit,
    TrailingStopHit,
    TargetHit,
    TimeBasedExit,
    /// Exit time reached before a straddle could be sold.
    EntryWindowClosed,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopLossHit => write!(f, "Stop Loss Hit"),
            Self::TrailingStopHit => write!(f, "Trailing Stop Hit"),
            Self::TargetHit => write!(f, "Target Hit"),
            Self::TimeBasedExit => write!(f, "Time Based Exit"),
            Self::EntryWindowClosed => write!(f, "Entry Window Closed"),
        }
    }
}

/// Human-readable record of a state change, kept for presentation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

/// Read-only view of the engine and its ledger at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub timestamp: NaiveDateTime,
    pub state: StrategyState,
    pub entry_strike: Option<i64>,
    pub quantity: i64,
    pub current_combined_premium: Decimal,
    pub entry_combined_premium: Decimal,
    pub stop_loss: Decimal,
    pub target: Decimal,
    pub lowest_premium: Decimal,
    pub trailing_active: bool,
    pub exit_reason: Option<ExitReason>,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub trades: Vec<TradeRecord>,
    pub journal: Vec<JournalEntry>,
}

impl StatusSnapshot {
    /// True when the session ended without ever selling the straddle.
    #[must_use]
    pub const fn never_entered(&self) -> bool {
        matches!(self.state, StrategyState::Exited) && self.entry_strike.is_none()
    }
}
