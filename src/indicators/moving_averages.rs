/// Simple Moving Average (SMA)
/// Arithmetic mean over a trailing window of observations
pub struct SMA {
    window: usize,
    min_periods: usize,
}

impl SMA {
    /// Full-window SMA: positions with fewer than `window` observations are NaN
    pub fn new(window: usize) -> Self {
        Self {
            window,
            min_periods: window,
        }
    }

    /// Minimum number of valid observations required to produce a value.
    /// With `1` the average is defined from the first sample on.
    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods.max(1);
        self
    }

    /// Calculate the rolling mean for a price series
    /// Returns a vector of the same length as input
    /// NaN prices are skipped in the mean but still occupy a window slot
    pub fn calculate(&self, prices: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; prices.len()];

        if self.window == 0 {
            return result;
        }

        let mut sum = 0.0;
        let mut count = 0usize;

        for i in 0..prices.len() {
            if !prices[i].is_nan() {
                sum += prices[i];
                count += 1;
            }

            // Slide the window: drop the observation that just fell out
            if i >= self.window {
                let old = prices[i - self.window];
                if !old.is_nan() {
                    sum -= old;
                    count -= 1;
                }
            }

            if count >= self.min_periods {
                result[i] = sum / count as f64;
            }
        }

        result
    }
}

/// Exponentially Weighted Moving Average (EWM)
/// Adjusted weighting: y(t) = sum((1-a)^i * x(t-i)) / sum((1-a)^i)
pub struct EWM {
    alpha: f64,
    min_periods: usize,
}

impl EWM {
    /// Parameterise by center of mass: a = 1 / (1 + com)
    pub fn with_com(com: f64) -> Self {
        Self {
            alpha: 1.0 / (1.0 + com),
            min_periods: 1,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Calculate the adjusted EWM for a series
    /// Returns a vector of the same length as input
    /// A NaN observation adds no weight, but older observations keep decaying
    /// across it (positions are absolute, NaNs are not ignored).
    pub fn calculate(&self, values: &[f64]) -> Vec<f64> {
        let decay = 1.0 - self.alpha;
        let mut result = Vec::with_capacity(values.len());

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let mut observations = 0usize;

        for &value in values {
            numerator *= decay;
            denominator *= decay;

            if !value.is_nan() {
                numerator += value;
                denominator += 1.0;
                observations += 1;
            }

            if observations >= self.min_periods && denominator > 0.0 {
                result.push(numerator / denominator);
            } else {
                result.push(f64::NAN);
            }
        }

        result
    }
}
