//! Summary statistics, robust limits, histograms and tick placement.
//!
//! NaN values mark missing pixels and are skipped everywhere in this module.

use std::fmt;

use crate::{ImagePlotError, ImagePlotResult};

/// Percentile of the non-NaN values with linear interpolation between ranks.
///
/// Returns `None` when there are no finite values. `q` is clamped to `[0, 100]`.
pub fn nan_percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    Some(percentile_of_sorted(&sorted, q))
}

fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Minimum and maximum of the non-NaN values.
pub fn nan_min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Descriptive statistics shown when an image is plotted with `describe`.
///
/// Variance uses one degree of freedom; skewness and kurtosis are the biased
/// moment estimators, kurtosis in the Fisher convention (normal = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSummary {
    /// Number of non-NaN values.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample variance (ddof = 1); 0 for a single value.
    pub variance: f64,
    /// Skewness; 0 when the variance is 0.
    pub skewness: f64,
    /// Excess kurtosis; -3 when the variance is 0.
    pub kurtosis: f64,
}

/// Computes an [`ImageSummary`] over the non-NaN values.
pub fn describe(values: &[f64]) -> Option<ImageSummary> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let (min, max) = nan_min_max(finite.iter().copied())?;
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;

    let (m2, m3, m4) = finite.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &v| {
        let d = v - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);

    let variance = if finite.len() > 1 {
        m2 * n / (n - 1.0)
    } else {
        0.0
    };
    let (skewness, kurtosis) = if m2 > 0.0 {
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, -3.0)
    };

    Some(ImageSummary {
        count: finite.len(),
        min,
        max,
        mean,
        variance,
        skewness,
        kurtosis,
    })
}

impl fmt::Display for ImageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "No. of Obs. : {}", self.count)?;
        writeln!(f, "Min. Value : {}", self.min)?;
        writeln!(f, "Max. Value : {}", self.max)?;
        writeln!(f, "Mean : {}", self.mean)?;
        writeln!(f, "Variance : {}", self.variance)?;
        writeln!(f, "Skewness : {}", self.skewness)?;
        write!(f, "Kurtosis : {}", self.kurtosis)
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, `counts.len() + 1` entries.
    pub edges: Vec<f64>,
    /// Number of values per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Computes a histogram of the non-NaN `values` over `range`.
    ///
    /// The last bin includes its right edge; values outside the range are
    /// dropped. A degenerate range is widened by 0.5 on each side.
    pub fn new(values: &[f64], bins: usize, range: (f64, f64)) -> ImagePlotResult<Self> {
        if bins == 0 {
            return Err(ImagePlotError::invalid_parameter(
                "bins",
                "must be a positive integer",
            ));
        }
        let (mut lo, mut hi) = range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(ImagePlotError::invalid_parameter(
                "range",
                format!("invalid histogram range ({lo}, {hi})"),
            ));
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            if v.is_nan() || v < lo || v > hi {
                continue;
            }
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Ok(Self { edges, counts })
    }

    /// Centre of each bin.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Number of counted values.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Largest bin count.
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Choose a "nice" step given a rough desired step.
/// Uses 1–2–5 × 10^k progression.
fn nice_step(rough: f64) -> f64 {
    let exp = rough.log10().floor();
    let base = 10f64.powf(exp);
    let mant = rough / base;
    let nice_mant = if mant <= 1.0 {
        1.0
    } else if mant <= 2.0 {
        2.0
    } else if mant <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice_mant * base
}

/// Tick positions inside `[vmin, vmax]` with ~`target` intervals on a 1–2–5 grid.
pub fn nice_ticks(vmin: f64, vmax: f64, target: usize) -> Vec<f64> {
    if !(vmin.is_finite() && vmax.is_finite()) || vmax <= vmin {
        return if vmin.is_finite() { vec![vmin] } else { Vec::new() };
    }
    let step = nice_step((vmax - vmin) / target.max(1) as f64);
    let first = (vmin / step).ceil() as i64;
    let last = (vmax / step).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .collect()
}

/// Logarithmically spaced ticks: the powers of ten inside `[vmin, vmax]`.
pub fn log_ticks(vmin: f64, vmax: f64) -> Vec<f64> {
    if vmin <= 0.0 || vmax <= vmin {
        return Vec::new();
    }
    let first = vmin.log10().ceil() as i32;
    let last = vmax.log10().floor() as i32;
    (first..=last).map(|e| 10f64.powi(e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_percentile_interpolates_and_skips_nan() {
        let values = [4.0, f64::NAN, 1.0, 3.0, 2.0];
        assert_approx_eq!(nan_percentile(&values, 0.0).unwrap(), 1.0, 1e-12);
        assert_approx_eq!(nan_percentile(&values, 100.0).unwrap(), 4.0, 1e-12);
        assert_approx_eq!(nan_percentile(&values, 50.0).unwrap(), 2.5, 1e-12);
        assert_approx_eq!(nan_percentile(&values, 25.0).unwrap(), 1.75, 1e-12);
        assert!(nan_percentile(&[f64::NAN], 50.0).is_none());
    }

    #[test]
    fn test_describe() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let summary = describe(&values).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_approx_eq!(summary.mean, 3.0, 1e-12);
        // mean((x - 3)^2) = 2, ddof=1 -> 2.5
        assert_approx_eq!(summary.variance, 2.5, 1e-12);
        assert!(summary.skewness.abs() < 1e-12);
        // m4 = 6.8, m2 = 2 -> 6.8 / 4 - 3
        assert_approx_eq!(summary.kurtosis, -1.3, 1e-9);
        assert!(summary.to_string().starts_with("No. of Obs. : 5"));
    }

    #[test]
    fn test_describe_constant_image() {
        let summary = describe(&[2.0, 2.0, 2.0]).unwrap();
        assert_eq!(summary.variance, 0.0);
        assert_eq!(summary.skewness, 0.0);
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_histogram_bins() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, 2.0, f64::NAN];
        let hist = Histogram::new(&values, 2, (0.0, 1.0)).unwrap();
        assert_eq!(hist.counts, vec![2, 3]);
        assert_eq!(hist.edges, vec![0.0, 0.5, 1.0]);
        assert_eq!(hist.centers(), vec![0.25, 0.75]);
        assert_eq!(hist.total(), 5);

        assert!(matches!(
            Histogram::new(&values, 0, (0.0, 1.0)),
            Err(ImagePlotError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let hist = Histogram::new(&[3.0, 3.0], 4, (3.0, 3.0)).unwrap();
        assert_eq!(hist.edges[0], 2.5);
        assert_eq!(hist.edges[4], 3.5);
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 3), vec![0.0, 5.0, 10.0]);
        assert_eq!(nice_ticks(0.13, 0.97, 3), vec![0.5]);
        assert_eq!(nice_ticks(0.0, 100.0, 4), vec![0.0, 50.0, 100.0]);
        assert_eq!(nice_ticks(1.0, 1.0, 3), vec![1.0]);
        assert_eq!(log_ticks(0.5, 2000.0), vec![1.0, 10.0, 100.0, 1000.0]);
    }
}
