use super::returns::log_returns;
use crate::error::{PriceError, Result};
use crate::models::PriceFrame;

/// Market proxy a security is measured against, keyed by its exchange code
/// (`<sym> <exchange> Equity`).
pub fn market_symbol_for(sym: &str) -> Result<&'static str> {
    match sym.split_whitespace().nth(1) {
        Some("CN") => Ok("XIC CN Equity"),
        Some("CT") => Ok("XIC CT Equity"),
        Some("US") => Ok("SPY US Equity"),
        _ => Err(PriceError::UnknownMarket(sym.to_string())),
    }
}

/// Ordinary least squares fit of a stock's log returns on its market's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beta {
    pub beta: f64,
    pub alpha: f64,
    pub r_squared: f64,
    pub observations: usize,
}

/// Regress `sym`'s log returns on its market proxy's log returns.
/// Both columns must be present in `price_ts`; rows where either return is
/// undefined are skipped.
pub fn calc_beta(price_ts: &PriceFrame, sym: &str) -> Result<Beta> {
    let mkt_sym = market_symbol_for(sym)?;
    let stk = log_returns(price_ts.require(sym)?);
    let mkt = log_returns(price_ts.require(mkt_sym)?);

    let pairs: Vec<(f64, f64)> = mkt
        .iter()
        .zip(stk.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .collect();

    if pairs.len() < 2 {
        return Err(PriceError::InsufficientData {
            needed: 2,
            actual: pairs.len(),
        });
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in &pairs {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
        syy += (y - mean_y) * (y - mean_y);
    }

    let beta = sxy / sxx;
    let alpha = mean_y - beta * mean_x;
    let r_squared = if syy == 0.0 {
        f64::NAN
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    tracing::debug!(
        "Beta of {} vs {}: {:.4} (r2 {:.4}, n {})",
        sym,
        mkt_sym,
        beta,
        r_squared,
        pairs.len()
    );

    Ok(Beta {
        beta,
        alpha,
        r_squared,
        observations: pairs.len(),
    })
}
