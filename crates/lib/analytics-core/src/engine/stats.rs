//! Descriptive statistics over slices of present values.
//!
//! Callers strip missing cells before calling in; every function returns
//! `None` when its statistic is undefined for the input (too few values or
//! zero variance).

#[allow(clippy::cast_precision_loss)]
fn len_f64(len: usize) -> f64 {
    len as f64
}

// Spread this small relative to the mean is rounding noise from a constant series.
fn negligible_spread(sum_of_squares: f64, count: usize, mean: f64) -> bool {
    let spread = (sum_of_squares / len_f64(count)).sqrt();
    spread <= 0.0 || spread <= 4.0 * f64::EPSILON * mean.abs()
}

#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / len_f64(values.len()))
}

/// Sample standard deviation (n - 1 denominator).
#[must_use]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((squares / len_f64(values.len() - 1)).sqrt())
}

/// Whether the values vary at all; a single value has no spread.
#[must_use]
pub fn has_spread(values: &[f64]) -> bool {
    let Some(mean) = mean(values) else {
        return false;
    };
    let squares: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    values.len() > 1 && !negligible_spread(squares, values.len(), mean)
}

#[must_use]
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().min_by(f64::total_cmp)
}

#[must_use]
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().max_by(f64::total_cmp)
}

/// Quantile of already sorted values, interpolating linearly between ranks.
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * len_f64(last);
    let lower = position.floor();
    let fraction = position - lower;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower_index = (lower as usize).min(last);
    let upper_index = (lower_index + 1).min(last);
    let low = *sorted.get(lower_index)?;
    let high = *sorted.get(upper_index)?;
    Some(low.mul_add(1.0 - fraction, high * fraction))
}

#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

/// Most frequent value; ties go to the smallest.
#[must_use]
pub fn mode(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let mut best: Option<(f64, usize)> = None;
    let mut index = 0;
    while let Some(&value) = sorted.get(index) {
        let run = sorted[index..]
            .iter()
            .take_while(|candidate| candidate.total_cmp(&value).is_eq())
            .count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        index += run;
    }
    best.map(|(value, _)| value)
}

fn central_moment(values: &[f64], mean: f64, power: i32) -> f64 {
    values.iter().map(|value| (value - mean).powi(power)).sum::<f64>() / len_f64(values.len())
}

/// Adjusted Fisher-Pearson skewness; needs three values and non-zero variance.
#[must_use]
pub fn skewness(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let mean = mean(values)?;
    let m2 = central_moment(values, mean, 2);
    if negligible_spread(m2, 1, mean) {
        return None;
    }
    let m3 = central_moment(values, mean, 3);
    let n = len_f64(values.len());
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected excess kurtosis; needs four values and non-zero variance.
#[must_use]
pub fn kurtosis(values: &[f64]) -> Option<f64> {
    if values.len() < 4 {
        return None;
    }
    let mean = mean(values)?;
    let m2 = central_moment(values, mean, 2);
    if negligible_spread(m2, 1, mean) {
        return None;
    }
    let m4 = central_moment(values, mean, 4);
    let n = len_f64(values.len());
    let g2 = m4 / m2.powi(2) - 3.0;
    Some((n + 1.0).mul_add(g2, 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

/// Pearson correlation over paired observations. Undefined for fewer than two
/// pairs or when either side has zero variance.
#[must_use]
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = len_f64(pairs.len());
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if negligible_spread(var_x, pairs.len(), mean_x)
        || negligible_spread(var_y, pairs.len(), mean_y)
    {
        return None;
    }
    Some((covariance / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Percentage of `part` in `total`, clamped to `[0, 100]`; zero when `total` is zero.
#[must_use]
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (len_f64(part) / len_f64(total) * 100.0).clamp(0.0, 100.0)
}
