#![allow(clippy::format_push_string)]

use rust_decimal::Decimal;
use straddle_core::StrategyConfig;

use crate::session::SessionSummary;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const THIN: &str = "───────────────────────────────────────────────────────────────\n";

pub struct SessionReport;

impl SessionReport {
    #[must_use]
    pub fn format(summary: &SessionSummary, config: &StrategyConfig) -> String {
        let status = &summary.status;
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                 SHORT STRADDLE SESSION                        \n");
        output.push_str(RULE);
        output.push('\n');

        output.push_str("Session\n");
        output.push_str(THIN);
        if let (Some(first), Some(last)) = (summary.history.first(), summary.history.last()) {
            output.push_str(&format!(
                "Period:                {} - {}\n",
                first.timestamp.format("%Y-%m-%d %H:%M"),
                last.timestamp.format("%H:%M")
            ));
        }
        output.push_str(&format!("Ticks:                 {}\n", summary.ticks));
        output.push_str(&format!("State:                 {}\n", status.state));
        output.push_str(&format!(
            "Exit Reason:           {}\n",
            status
                .exit_reason
                .map_or_else(|| "-".to_string(), |r| r.to_string())
        ));
        output.push('\n');

        output.push_str("Position\n");
        output.push_str(THIN);
        match status.entry_strike {
            Some(strike) => {
                output.push_str(&format!(
                    "Straddle:              {} {}\n",
                    config.index_symbol, strike
                ));
                output.push_str(&format!(
                    "Quantity:              {} ({} lots)\n",
                    status.quantity,
                    status.quantity / i64::from(config.lot_size.max(1))
                ));
                output.push_str(&format!(
                    "Entry Premium:         {:.2}\n",
                    status.entry_combined_premium.round_dp(2)
                ));
                output.push_str(&format!(
                    "Lowest Premium:        {:.2}\n",
                    status.lowest_premium.round_dp(2)
                ));
                let trailing = if status.trailing_active { " (trailing)" } else { "" };
                output.push_str(&format!(
                    "Stop Loss:             {:.2}{trailing}\n",
                    status.stop_loss.round_dp(2)
                ));
                output.push_str(&format!("Target:                {:.2}\n", status.target.round_dp(2)));
            }
            None => output.push_str("No straddle was sold this session.\n"),
        }
        output.push('\n');

        output.push_str("Performance\n");
        output.push_str(THIN);
        output.push_str(&format!("Capital:               {:.2}\n", config.total_capital));
        output.push_str(&format!("Realized PnL:          {:.2}\n", status.realized_pnl));
        output.push_str(&format!("Total PnL:             {:.2}\n", status.total_pnl));
        output.push_str(&format!(
            "Return on Capital:     {:.3}%\n",
            summary.return_on_capital * Decimal::from(100)
        ));
        output.push_str(&format!("Max Drawdown:          {:.2}\n", summary.max_drawdown));
        output.push('\n');

        if !status.trades.is_empty() {
            output.push_str("Trades\n");
            output.push_str(THIN);
            for trade in &status.trades {
                output.push_str(&format!(
                    "{}  {:<4} {:<16} {:>6} @ {:>9.2}  {:>12.2}\n",
                    trade.timestamp.format("%H:%M:%S"),
                    trade.side.to_string(),
                    trade.symbol.to_string(),
                    trade.quantity,
                    trade.price,
                    trade.value
                ));
            }
            output.push('\n');
        }

        output.push_str(RULE);
        output
    }
}
