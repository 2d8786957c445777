use super::moving_averages::EWM;

/// Relative Strength Index (RSI)
/// Measures momentum by comparing magnitude of recent gains to recent losses
/// Returns values between 0-100:
/// - Below 30: Oversold (potentially undervalued)
/// - Above 70: Overbought (potentially overvalued)
///
/// Gains and losses are smoothed with an adjusted exponential moving average
/// parameterised by center of mass (`com = 14` gives a = 1/15).
///
/// Degenerate cases are left to IEEE arithmetic and are NOT clamped:
/// - no down moves yet but some up moves: up/down = +inf, RSI is exactly 100.0
/// - no moves at all (first sample, flat prices): 0/0, RSI is NaN
pub struct RSI {
    com: f64,
}

impl RSI {
    pub fn new(period: usize) -> Self {
        Self { com: period as f64 }
    }

    /// Per-step gains and losses vs the previous sample.
    /// The first sample, and any comparison involving NaN, counts as no move.
    pub fn gains_losses(prices: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut up = vec![0.0; prices.len()];
        let mut down = vec![0.0; prices.len()];

        for i in 1..prices.len() {
            let (prev, curr) = (prices[i - 1], prices[i]);
            if curr > prev {
                up[i] = curr - prev;
            } else if curr < prev {
                down[i] = prev - curr;
            }
        }

        (up, down)
    }

    /// Calculate RSI for a price series
    /// Returns a vector of the same length as input
    pub fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        let (up, down) = Self::gains_losses(prices);

        let ewm = EWM::with_com(self.com);
        let up_ema = ewm.calculate(&up);
        let down_ema = ewm.calculate(&down);

        up_ema
            .iter()
            .zip(down_ema.iter())
            .map(|(u, d)| 100.0 - 100.0 / (1.0 + u / d))
            .collect()
    }
}
