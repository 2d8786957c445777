// Technical indicators module
// Provides calculation functions for the indicators attached to a price history

pub mod beta;
pub mod moving_averages;
pub mod returns;
pub mod rsi;

pub use beta::{calc_beta, market_symbol_for, Beta};
pub use moving_averages::{EWM, SMA};
pub use returns::{calc_returns, log_returns};
pub use rsi::RSI;

use crate::error::{PriceError, Result};
use crate::models::PriceFrame;

/// Rolling average days
pub const MAVG_DAYS: usize = 200;
/// RSI smoothing center of mass
pub const RSI_PERIOD: usize = 14;

/// Moving average column for the default window; see [`mavg_column`].
pub const MAVG_COLUMN: &str = "mavg_200d";
pub const PREV_PRICE_COLUMN: &str = "prev_pr";
pub const RSI_COLUMN: &str = "rsi";

/// Name of the moving average column for a `days`-sample window.
pub fn mavg_column(days: usize) -> String {
    format!("mavg_{}d", days)
}

/// Append the 200-day moving average, the previous price and the RSI of
/// `sym` to `price_ts`, in place. Existing columns of the same name are
/// replaced.
pub fn calc_indicators(price_ts: &mut PriceFrame, sym: &str) -> Result<()> {
    calc_indicators_with(price_ts, sym, MAVG_DAYS, RSI_PERIOD)
}

/// [`calc_indicators`] with an explicit moving-average window and RSI period.
/// The moving average column is named after the window, e.g. `mavg_50d`.
pub fn calc_indicators_with(
    price_ts: &mut PriceFrame,
    sym: &str,
    mavg_days: usize,
    rsi_period: usize,
) -> Result<()> {
    let prices = price_ts.require(sym)?.to_vec();

    let mavg = SMA::new(mavg_days).with_min_periods(1).calculate(&prices);

    let mut prev_pr = vec![f64::NAN; prices.len()];
    if prices.len() > 1 {
        prev_pr[1..].copy_from_slice(&prices[..prices.len() - 1]);
    }

    let rsi = RSI::new(rsi_period).calculate(&prices);

    price_ts.insert(&mavg_column(mavg_days), mavg)?;
    price_ts.insert(PREV_PRICE_COLUMN, prev_pr)?;
    price_ts.insert(RSI_COLUMN, rsi)?;

    tracing::debug!("Calculated indicators for {} over {} rows", sym, prices.len());
    Ok(())
}

/// The previous day's closing price of `sym`, assuming the history is current.
pub fn get_prev_price(hist_prices: &PriceFrame, sym: &str) -> Result<f64> {
    let prices = hist_prices.require(sym)?;
    if prices.len() < 2 {
        return Err(PriceError::InsufficientData {
            needed: 2,
            actual: prices.len(),
        });
    }
    Ok(prices[prices.len() - 2])
}
