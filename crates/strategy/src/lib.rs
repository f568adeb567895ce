//! Short straddle decision engine.
//!
//! Sells the at-the-money call and put once the entry time is reached, sizes
//! the position from a fixed risk budget, and closes both legs on a stop-loss,
//! target, trailing stop or the session's time exit.

pub mod error;
pub mod short_straddle;
pub mod sizing;
pub mod stops;
pub mod types;

pub use error::EntryError;
pub use short_straddle::{OpenStraddle, ShortStraddle};
pub use sizing::straddle_quantity;
pub use stops::Bracket;
pub use types::{ExitReason, JournalEntry, StatusSnapshot, StrategyState};
