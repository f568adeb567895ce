//! Session simulation CLI command.
//!
//! Drives the short straddle engine against the synthetic market one tick at a
//! time, logging periodic status lines and printing a report at the end.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use rust_decimal::Decimal;
use tracing::info;

use straddle_core::{PriceSource, DEFAULT_CONFIG_PATH};
use straddle_simulator::{write_trades_csv, Session, SessionReport, SyntheticMarket};
use straddle_strategy::{ShortStraddle, StrategyState};

use super::load_config;

/// Arguments for the run command.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Profile merged over the base file (reads Straddle.<profile>.toml)
    #[arg(long)]
    pub profile: Option<String>,

    /// Seed for the synthetic market (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Wall-clock delay between ticks in milliseconds (0 = as fast as possible)
    #[arg(long, default_value = "0")]
    pub delay_ms: u64,

    /// Log a status line every N simulated minutes
    #[arg(long, default_value = "15")]
    pub status_every: i64,

    /// Output format: text, json (default: text)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Write the trade log to this CSV file
    #[arg(long)]
    pub trades_csv: Option<String>,
}

/// Run one simulated session.
pub async fn run_session(args: RunArgs) -> Result<()> {
    if !matches!(args.format.as_str(), "text" | "json") {
        bail!("Unknown output format '{}', expected text or json", args.format);
    }
    if args.status_every <= 0 {
        bail!("--status-every must be positive");
    }

    let mut config = load_config(&args.config, args.profile.as_deref())?;
    if args.seed.is_some() {
        config.market.seed = args.seed;
    }

    let market = SyntheticMarket::new(config.market.clone(), config.strategy.market_open);
    info!(
        seed = market.seed(),
        index = config.strategy.index_symbol,
        lot_size = config.strategy.lot_size,
        risk = %config.strategy.fixed_risk_per_trade,
        entry = %config.strategy.entry_time,
        exit = %config.strategy.exit_time,
        "Starting session"
    );

    let mut session = Session::new(market, ShortStraddle::new(config.strategy.clone()));
    let mut last_state = session.engine().state();

    while !session.is_finished() {
        let state = session.step();

        let now = session.market().current_time();
        let elapsed = (now.time() - config.strategy.market_open).num_minutes();
        if state != last_state || elapsed % args.status_every == 0 {
            log_status(&session);
        }
        last_state = state;

        if args.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.delay_ms)).await;
        }
    }

    let summary = session.summary();
    if summary.status.state != StrategyState::Exited {
        info!("Session closed before the strategy exited");
    }

    if let Some(path) = &args.trades_csv {
        write_trades_csv(path, &summary.status.trades)?;
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => println!("{}", SessionReport::format(&summary, &config.strategy)),
    }

    Ok(())
}

fn log_status(session: &Session<SyntheticMarket>) {
    let engine = session.engine();
    let market = session.market();
    let premium: Decimal = engine.leg_prices(market).values().copied().sum();

    info!(
        time = %market.current_time().format("%H:%M"),
        state = %engine.state(),
        spot = %market.spot_price(),
        premium = %premium,
        stop_loss = %engine.stop_loss().unwrap_or_default(),
        trailing = engine.trailing_active(),
        pnl = %engine.total_pnl(market).round_dp(2),
        "Status"
    );
}
