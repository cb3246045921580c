//! Pearson correlation with undefined cases reported as NaN.

/// Machine epsilons of the data's magnitude a spread must exceed to count
/// as variance rather than rounding.
pub(crate) const ROUNDING_ULPS: f64 = 16.0;

/// Whether `spread` is indistinguishable from rounding at `magnitude`.
pub(crate) fn is_rounding_level(spread: f64, magnitude: f64) -> bool {
    !(spread > ROUNDING_ULPS * f64::EPSILON * magnitude)
}

fn magnitude(values: &[f64], mean: f64) -> f64 {
    values.iter().fold(mean.abs(), |acc, v| acc.max(v.abs()))
}

/// Pearson correlation coefficient of two paired series.
///
/// Returns NaN for fewer than two pairs, mismatched lengths, or when either
/// series has no variance. The result is clamped to [-1, 1].
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let std_x = (var_x / n).sqrt();
    let std_y = (var_y / n).sqrt();
    if is_rounding_level(std_x, magnitude(x, mean_x))
        || is_rounding_level(std_y, magnitude(y, mean_y))
    {
        return f64::NAN;
    }

    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

// -- Tests -------------------------------------------------------------------
