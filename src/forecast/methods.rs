//! Moving-average, exponential-smoothing and fallback forecasts.

use crate::analytics::stats::{mean, std_dev};
use crate::forecast::series::{DailySeries, Metric};
use crate::forecast::ForecastError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Weekly rhythm multiplier, Monday first.
const SEASONALITY: [f64; 7] = [0.95, 1.05, 1.10, 1.05, 0.90, 0.60, 0.50];

pub fn seasonality_factor(weekday: Weekday) -> f64 {
    SEASONALITY[weekday.num_days_from_monday() as usize]
}

/// Gaussian noise, or uniform noise when there is no spread to scale by.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Noise {
    Gaussian(f64),
    Uniform(f64),
}

impl Noise {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, ForecastError> {
        match *self {
            Self::Gaussian(sd) => Normal::new(0.0, sd)
                .map(|n| n.sample(rng))
                .map_err(|e| ForecastError::Computation(format!("noise distribution: {e}"))),
            Self::Uniform(half) => Ok(Uniform::new_inclusive(-half, half).sample(rng)),
        }
    }
}

/// A forecast: one value per day starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

fn forecast_dates(after: NaiveDate, horizon: usize) -> impl Iterator<Item = NaiveDate> {
    (1..=horizon).map(move |i| after + Duration::days(i as i64))
}

/// Moving-average step before noise.
pub fn ma_point(smoothed_last: f64, trend: f64, step: usize, date: NaiveDate) -> f64 {
    smoothed_last * seasonality_factor(date.weekday()) + trend * step as f64 * 0.8
}

/// Exponential-smoothing step before noise.
pub fn es_point(smoothed_last: f64, trend: f64, step: usize, date: NaiveDate) -> f64 {
    (smoothed_last + trend * step as f64 * 0.6) * seasonality_factor(date.weekday())
}

/// Trailing rolling mean with a minimum of one observation.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let from = (i + 1).saturating_sub(window);
            mean(&values[from..=i])
        })
        .collect()
}

/// Single exponential smoothing seeded with the first observation.
pub fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for &x in values {
        let next = match out.last() {
            Some(prev) => alpha * x + (1.0 - alpha) * prev,
            None => x,
        };
        out.push(next);
    }
    out
}

fn ma_trend(x: &[f64]) -> f64 {
    let n = x.len();
    let mut trends = Vec::new();
    if n >= 3 {
        let w = n.min(7);
        trends.push((x[n - 1] - x[n - w]) / w as f64);
    }
    if n >= 2 {
        trends.push(0.5 * (x[n - 1] - x[0]) / n as f64);
    }
    mean(&trends)
}

fn es_trend<R: Rng + ?Sized>(s: &[f64], rng: &mut R) -> f64 {
    let n = s.len();
    let mut trends = Vec::new();
    if n >= 3 {
        trends.push((s[n - 1] - s[n - 3]) / 3.0);
    }
    if n >= 7 {
        trends.push(0.7 * (s[n - 1] - s[n - 7]) / 7.0);
    }
    if n >= 2 {
        trends.push(0.5 * (s[n - 1] - s[0]) / n as f64);
    }
    if trends.is_empty() {
        rng.gen_range(-1.0..=1.0)
    } else {
        mean(&trends)
    }
}

fn require_history(series: &DailySeries) -> Result<(), ForecastError> {
    if series.len() < 2 {
        return Err(ForecastError::Computation(format!(
            "need at least 2 points, got {}",
            series.len()
        )));
    }
    Ok(())
}

pub fn moving_average<R: Rng + ?Sized>(
    series: &DailySeries,
    metric: Metric,
    window: usize,
    horizon: usize,
    rng: &mut R,
) -> Result<Projection, ForecastError> {
    require_history(series)?;
    let x = &series.values;
    let n = x.len();
    let window = if n < window { (n / 2).max(3) } else { window };

    let ma = rolling_mean(x, window);
    let base = ma[n - 1];
    let trend = ma_trend(x);
    let sd = std_dev(x, 1);
    let volatility = if sd > 0.0 { sd } else { mean(x) * 0.15 };
    let noise = if volatility > 0.0 {
        Noise::Gaussian(volatility * 0.2)
    } else {
        Noise::Uniform(2.0)
    };
    tracing::debug!(metric = metric.name(), window, trend, volatility, "moving average");

    let values = forecast_dates(series.last_date(), horizon)
        .enumerate()
        .map(|(k, date)| {
            let v = ma_point(base, trend, k + 1, date) + noise.sample(rng)?;
            Ok(metric.bound(v))
        })
        .collect::<Result<Vec<_>, ForecastError>>()?;

    Ok(Projection {
        start: series.last_date() + Duration::days(1),
        values,
    })
}

pub fn exponential_smoothing<R: Rng + ?Sized>(
    series: &DailySeries,
    metric: Metric,
    alpha: f64,
    horizon: usize,
    rng: &mut R,
) -> Result<Projection, ForecastError> {
    require_history(series)?;
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ForecastError::Computation(format!(
            "smoothing constant out of range: {alpha}"
        )));
    }
    let s = smooth(&series.values, alpha);
    let last = s[s.len() - 1];
    let trend = es_trend(&s, rng);
    let sd = std_dev(&series.values, 1);
    let noise = if sd > 0.0 {
        Noise::Gaussian(sd * 0.15)
    } else {
        Noise::Uniform(3.0)
    };
    tracing::debug!(metric = metric.name(), alpha, trend, sd, "exponential smoothing");

    let values = forecast_dates(series.last_date(), horizon)
        .enumerate()
        .map(|(k, date)| {
            let v = es_point(last, trend, k + 1, date) + noise.sample(rng)?;
            Ok(metric.bound(v))
        })
        .collect::<Result<Vec<_>, ForecastError>>()?;

    Ok(Projection {
        start: series.last_date() + Duration::days(1),
        values,
    })
}

/// Forecast for sparse history. With no history, uniform 60-80 values start
/// the day after `anchor`; otherwise a ramp from the mean to 110% of it,
/// scaled by weekday and perturbed by 10% noise, clipped to [0, 100].
pub fn fallback<R: Rng + ?Sized>(
    series: Option<&DailySeries>,
    anchor: NaiveDate,
    horizon: usize,
    rng: &mut R,
) -> Result<Projection, ForecastError> {
    let Some(series) = series.filter(|s| !s.is_empty()) else {
        let dist = Uniform::new(60.0, 80.0);
        return Ok(Projection {
            start: anchor + Duration::days(1),
            values: (0..horizon).map(|_| dist.sample(rng)).collect(),
        });
    };

    let m = mean(&series.values);
    let noise = Normal::new(0.0, (m * 0.1).abs())
        .map_err(|e| ForecastError::Computation(format!("noise distribution: {e}")))?;
    let ramp = linspace(m, m * 1.1, horizon);

    let values = forecast_dates(series.last_date(), horizon)
        .zip(ramp)
        .map(|(date, base)| {
            (base * seasonality_factor(date.weekday()) + noise.sample(rng)).clamp(0.0, 100.0)
        })
        .collect();

    Ok(Projection {
        start: series.last_date() + Duration::days(1),
        values,
    })
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
