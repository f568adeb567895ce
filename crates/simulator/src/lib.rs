//! Synthetic market and session driver for the short straddle engine.

pub mod export;
pub mod market;
pub mod report;
pub mod session;

pub use export::{write_trades, write_trades_csv};
pub use market::SyntheticMarket;
pub use report::SessionReport;
pub use session::{max_drawdown, PnlPoint, Session, SessionSummary, SimulatedMarket};
