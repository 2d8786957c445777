use crate::models::PriceFrame;

/// Log (continuously compounded) returns: r(t) = ln p(t) - ln p(t-1).
/// The first entry has no prior observation and is NaN.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    let mut result = vec![f64::NAN; prices.len()];

    for i in 1..prices.len() {
        result[i] = prices[i].ln() - prices[i - 1].ln();
    }

    result
}

/// Log returns for every column of a frame, on the same date index.
pub fn calc_returns(hist_prices: &PriceFrame) -> PriceFrame {
    hist_prices.map_columns(log_returns)
}
