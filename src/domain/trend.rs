// Least-squares trend detection over a series window

pub const DEFAULT_SLOPE_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendResult {
    pub slope: f64,
    pub triggered: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TrendDetector {
    threshold: f64,
}

impl TrendDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Fit a line through `values` and flag it when the slope magnitude
    /// strictly exceeds the threshold. `None` when the slope is undefined.
    pub fn evaluate(&self, values: &[f64]) -> Option<TrendResult> {
        let slope = least_squares_slope(values)?;
        Some(TrendResult {
            slope,
            triggered: slope.abs() > self.threshold,
        })
    }
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SLOPE_THRESHOLD)
    }
}

/// Ordinary least-squares slope of `values` against 1-based arrival index.
pub fn least_squares_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (index, &y) in values.iter().enumerate() {
        let x = (index + 1) as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let n = n as f64;
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    Some((n * sum_xy - sum_x * sum_y) / denominator)
}
