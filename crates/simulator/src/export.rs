use anyhow::Result;
use std::io::Write;
use straddle_core::TradeRecord;

/// Writes the trade log as CSV with a header row.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized or the writer fails.
pub fn write_trades<W: Write>(writer: W, trades: &[TradeRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for trade in trades {
        csv.serialize(trade)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the trade log to a CSV file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_trades_csv(path: &str, trades: &[TradeRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_trades(file, trades)?;
    tracing::info!(path, count = trades.len(), "Trade log written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use straddle_core::{InstrumentSymbol, OptionKind, OrderSide};

    #[test]
    fn writes_header_and_rows() {
        let trade = TradeRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 17, 0)
                .unwrap(),
            symbol: InstrumentSymbol::option("NIFTY", 19500, OptionKind::Call),
            side: OrderSide::Sell,
            quantity: 250,
            price: dec!(101.25),
            value: dec!(25312.50),
        };

        let mut buffer = Vec::new();
        write_trades(&mut buffer, &[trade]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("timestamp,symbol,side,quantity,price,value"));
        assert_eq!(
            lines.next(),
            Some("2024-01-15T09:17:00,NIFTY19500CE,SELL,250,101.25,25312.50")
        );
        assert_eq!(lines.next(), None);
    }
}
