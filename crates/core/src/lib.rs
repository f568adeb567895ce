pub mod config;
pub mod config_loader;
pub mod events;
pub mod ledger;
pub mod time;
pub mod traits;

pub use config::{AppConfig, MarketConfig, StrategyConfig};
pub use config_loader::{ConfigLoader, DEFAULT_CONFIG_PATH};
pub use events::{InstrumentSymbol, OptionKind, OrderSide, TradeRecord};
pub use ledger::{Ledger, Position};
pub use traits::PriceSource;
