//! Numeric helpers shared by the aggregation and report layers.
//!
//! Every function here guards against empty input so reports over an
//! empty dataset render as flat zeros instead of NaN.

use serde::{Deserialize, Serialize};

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Share of `count` in `total` as a percentage, rounded to one decimal.
///
/// Returns 0.0 when `total` is zero.
pub fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(count as f64 * 100.0 / total as f64)
}

/// One-decimal percentage shares for counts that partition `total`,
/// allocated so the shares sum to exactly 100.0.
///
/// Works in tenths of a percent: each share keeps the floor of its
/// exact value and the leftover tenths go to the largest remainders,
/// earlier entries winning ties. Shares that divide evenly stay
/// untouched. Returns all zeros when `total` is zero.
pub fn apportion_percents(counts: &[usize], total: usize) -> Vec<f64> {
    if total == 0 {
        return vec![0.0; counts.len()];
    }

    let total = total as u64;
    let mut tenths = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for (i, &count) in counts.iter().enumerate() {
        let scaled = count as u64 * 1000;
        tenths.push(scaled / total);
        remainders.push((i, scaled % total));
    }

    let assigned: u64 = tenths.iter().sum();
    let mut leftover = 1000_u64.saturating_sub(assigned);
    remainders.sort_by_key(|&(_, rem)| std::cmp::Reverse(rem));
    for (i, _) in remainders {
        if leftover == 0 {
            break;
        }
        tenths[i] += 1;
        leftover -= 1;
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolated percentile, with `p` clamped to `[0, 100]`.
///
/// Returns 0.0 for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Rescales a series to the unit interval for sparkline-style charts.
///
/// A constant series has no width and maps to all zeros.
pub fn scale_unit(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = max - min;
    if width == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / width).collect()
}

/// Range and mean of an observed value series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
    /// Arithmetic mean of the series.
    pub mean: f64,
    /// Sum of the series.
    pub sum: f64,
}

impl ValueStats {
    /// Computes stats over a series; `None` when nothing was observed.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            min,
            max,
            mean: mean(values),
            sum: values.iter().sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_guards_zero_total() {
        assert_eq!(pct(5, 0), 0.0);
        assert_eq!(pct(0, 10), 0.0);
        assert_eq!(pct(1, 3), 33.3);
        assert_eq!(pct(2, 3), 66.7);
    }

    #[test]
    fn test_apportion_percents_sums_to_one_hundred() {
        // Rounding each share alone would give 6 x 16.7 = 100.2.
        assert_eq!(
            apportion_percents(&[1, 1, 1, 1, 1, 1], 6),
            vec![16.7, 16.7, 16.7, 16.7, 16.6, 16.6]
        );
        assert_eq!(apportion_percents(&[1, 1, 1], 3), vec![33.4, 33.3, 33.3]);
        // Exact shares come through unadjusted.
        assert_eq!(apportion_percents(&[10, 5, 3, 2], 20), vec![50.0, 25.0, 15.0, 10.0]);
    }

    #[test]
    fn test_apportion_percents_guards_zero_total() {
        assert_eq!(apportion_percents(&[3, 2], 0), vec![0.0, 0.0]);
        assert!(apportion_percents(&[], 0).is_empty());
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(50.0), 50.0);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 2.5);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert_eq!(percentile(&[7.0], 90.0), 7.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_scale_unit_handles_constant_series() {
        assert_eq!(scale_unit(&[5.0, 5.0, 5.0]), vec![0.0, 0.0, 0.0]);
        assert_eq!(scale_unit(&[0.0, 5.0, 10.0]), vec![0.0, 0.5, 1.0]);
        assert!(scale_unit(&[]).is_empty());
    }

    #[test]
    fn test_value_stats() {
        assert_eq!(ValueStats::from_values(&[]), None);

        let stats = ValueStats::from_values(&[100.0, 300.0, 200.0]).unwrap();
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 300.0);
        assert_eq!(stats.mean, 200.0);
        assert_eq!(stats.sum, 600.0);
    }
}
