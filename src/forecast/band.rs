//! Chart helpers: confidence band and linear trend over a forecast.

use crate::analytics::stats::{mean, std_dev};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub lower: f64,
    pub upper: f64,
}

/// Half-width of the band as a fraction of each value.
pub fn band_factor(values: &[f64]) -> f64 {
    let sd = std_dev(values, 1);
    if sd > 10.0 {
        0.25
    } else if sd > 0.0 {
        0.15
    } else {
        0.10
    }
}

pub fn confidence_band(values: &[f64], percentage: bool) -> Vec<BandPoint> {
    let f = band_factor(values);
    values
        .iter()
        .map(|&v| {
            let (mut lower, mut upper) = (v * (1.0 - f), v * (1.0 + f));
            if percentage {
                lower = lower.max(0.0);
                upper = upper.min(100.0);
            }
            BandPoint { lower, upper }
        })
        .collect()
}

/// Least-squares line evaluated at each index, or `None` for fewer than two points.
pub fn trend_line(values: &[f64]) -> Option<Vec<f64>> {
    if values.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let (mx, my) = (mean(&xs), mean(values));
    let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    let sxy: f64 = xs.iter().zip(values).map(|(x, y)| (x - mx) * (y - my)).sum();
    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    Some(xs.iter().map(|x| intercept + slope * x).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_by_spread() {
        assert_eq!(band_factor(&[10.0, 60.0, 90.0]), 0.25);
        assert_eq!(band_factor(&[50.0, 52.0]), 0.15);
        assert_eq!(band_factor(&[40.0, 40.0, 40.0]), 0.10);
    }

    #[test]
    fn percentage_band_is_clipped() {
        let band = confidence_band(&[95.0, 95.0], true);
        assert!((band[0].lower - 85.5).abs() < 1e-9);
        assert_eq!(band[0].upper, 100.0);

        let band = confidence_band(&[95.0, 95.0], false);
        assert!((band[1].upper - 104.5).abs() < 1e-9);
    }

    #[test]
    fn trend_line_fits_exact_line() {
        let line = trend_line(&[1.0, 3.0, 5.0, 7.0]).unwrap();
        for (got, want) in line.iter().zip([1.0, 3.0, 5.0, 7.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!(trend_line(&[4.0]).is_none());
    }
}
