//! Per-metric forecast entry points and the forecast summary.

use crate::analytics::stats::{mean, round1};
use crate::domain::record::TaskRecord;
use crate::forecast::band::{confidence_band, trend_line, BandPoint};
use crate::forecast::methods::{exponential_smoothing, fallback, moving_average, Projection};
use crate::forecast::series::{DailySeries, Metric};
use crate::forecast::{ForecastError, ForecastSettings};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    MovingAverage,
    ExponentialSmoothing,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// History and forecast for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricForecast {
    pub metric: Metric,
    pub method: Method,
    pub history: Option<DailySeries>,
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl MetricForecast {
    fn new(metric: Metric, method: Method, history: Option<DailySeries>, p: Projection) -> Self {
        Self {
            metric,
            method,
            history,
            start: p.start,
            values: p.values,
        }
    }

    pub fn points(&self) -> Vec<ForecastPoint> {
        self.start
            .iter_days()
            .zip(&self.values)
            .map(|(date, &value)| ForecastPoint { date, value })
            .collect()
    }

    pub fn band(&self) -> Vec<BandPoint> {
        confidence_band(&self.values, self.metric.is_percentage())
    }

    pub fn trend_line(&self) -> Option<Vec<f64>> {
        trend_line(&self.values)
    }

    fn delta(&self) -> f64 {
        match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Index and value of the first maximum.
    fn peak(&self) -> (NaiveDate, f64) {
        self.extreme(|candidate, best| candidate > best)
    }

    fn trough(&self) -> (NaiveDate, f64) {
        self.extreme(|candidate, best| candidate < best)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> (NaiveDate, f64) {
        let mut best = (0, self.values.first().copied().unwrap_or(0.0));
        for (i, &v) in self.values.iter().enumerate().skip(1) {
            if better(v, best.1) {
                best = (i, v);
            }
        }
        (self.start + Duration::days(best.0 as i64), best.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Direction of `delta`, treating `|delta| <= dead_zone` as stable.
    pub fn classify(delta: f64, dead_zone: f64) -> Self {
        if delta > dead_zone {
            Self::Increasing
        } else if delta < -dead_zone {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }

    /// Wording used for completion rates.
    pub fn progress_label(&self) -> &'static str {
        match self {
            Self::Increasing => "improving",
            Self::Decreasing => "declining",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        };
        write!(f, "{s}")
    }
}

pub const SCORE_DEAD_ZONE: f64 = 1.0;
pub const WORKLOAD_DEAD_ZONE: f64 = 10.0;
pub const COMPLETION_DEAD_ZONE: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityOutlook {
    pub avg_forecast: f64,
    pub trend: Trend,
    pub trend_magnitude: f64,
    pub best_day: String,
    pub best_day_score: f64,
    pub worst_day: String,
    pub worst_day_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadOutlook {
    pub total_hours_forecast: f64,
    pub avg_daily_hours: f64,
    pub trend: Trend,
    pub busiest_day: String,
    pub busiest_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutlook {
    pub total_tasks_forecast: i64,
    pub avg_daily_tasks: f64,
    pub peak_day: String,
    pub peak_tasks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutlook {
    pub avg_rate: f64,
    pub trend: &'static str,
    pub best_day: String,
    pub best_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub horizon: usize,
    pub forecast_start: NaiveDate,
    pub forecast_end: NaiveDate,
    #[serde(with = "crate::domain::record::datetime_format")]
    pub generated_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub productivity: Option<ProductivityOutlook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<WorkloadOutlook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<TaskOutlook>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionOutlook>,
    pub insights: Vec<String>,
}

fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    pub settings: ForecastSettings,
}

impl Forecaster {
    pub fn new(settings: ForecastSettings) -> Self {
        Self { settings }
    }

    pub fn forecast<R: Rng + ?Sized>(
        &self,
        metric: Metric,
        records: &[TaskRecord],
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<MetricForecast, ForecastError> {
        match metric {
            Metric::ProductivityScore => self.productivity_score(records, today, rng),
            Metric::Workload => self.workload(records, today, rng),
            Metric::TaskCount => self.task_count(records, today, rng),
            Metric::CompletionRate => self.completion_rate(records, today, rng),
        }
    }

    pub fn productivity_score<R: Rng + ?Sized>(
        &self,
        records: &[TaskRecord],
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<MetricForecast, ForecastError> {
        let horizon = self.settings.check_horizon()?;
        let metric = Metric::ProductivityScore;
        let series = DailySeries::build(records, metric).ok_or(ForecastError::NoData)?;
        if series.len() < 2 {
            let p = fallback(Some(&series), today, horizon, rng)?;
            return Ok(MetricForecast::new(metric, Method::Fallback, Some(series), p));
        }
        let p = exponential_smoothing(&series, metric, self.settings.score_alpha, horizon, rng)?;
        Ok(MetricForecast::new(metric, Method::ExponentialSmoothing, Some(series), p))
    }

    pub fn workload<R: Rng + ?Sized>(
        &self,
        records: &[TaskRecord],
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<MetricForecast, ForecastError> {
        let horizon = self.settings.check_horizon()?;
        let metric = Metric::Workload;
        let series = DailySeries::build(records, metric);
        let (method, mut p) = match &series {
            Some(s) if s.len() >= 2 => (
                Method::MovingAverage,
                moving_average(s, metric, self.settings.window, horizon, rng)?,
            ),
            _ => (Method::Fallback, fallback(series.as_ref(), today, horizon, rng)?),
        };
        if method == Method::Fallback {
            p.values.iter_mut().for_each(|v| *v *= 60.0);
        }
        Ok(MetricForecast::new(metric, method, series, p))
    }

    pub fn task_count<R: Rng + ?Sized>(
        &self,
        records: &[TaskRecord],
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<MetricForecast, ForecastError> {
        let horizon = self.settings.check_horizon()?;
        let metric = Metric::TaskCount;
        let series = DailySeries::build(records, metric);
        let (method, mut p) = match &series {
            Some(s) if s.len() >= 2 => (
                Method::ExponentialSmoothing,
                exponential_smoothing(s, metric, self.settings.task_alpha, horizon, rng)?,
            ),
            _ => (Method::Fallback, fallback(series.as_ref(), today, horizon, rng)?),
        };
        p.values.iter_mut().for_each(|v| *v = v.round().max(0.0));
        Ok(MetricForecast::new(metric, method, series, p))
    }

    pub fn completion_rate<R: Rng + ?Sized>(
        &self,
        records: &[TaskRecord],
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<MetricForecast, ForecastError> {
        let horizon = self.settings.check_horizon()?;
        let metric = Metric::CompletionRate;
        let series = DailySeries::build(records, metric);
        let (method, mut p) = match &series {
            Some(s) if s.len() >= 2 => (
                Method::ExponentialSmoothing,
                exponential_smoothing(s, metric, self.settings.completion_alpha, horizon, rng)?,
            ),
            _ => (Method::Fallback, fallback(series.as_ref(), today, horizon, rng)?),
        };
        p.values.iter_mut().for_each(|v| *v = v.min(100.0));
        Ok(MetricForecast::new(metric, method, series, p))
    }

    /// Every metric that can be forecast, in `Metric::ALL` order.
    pub fn forecast_all<R: Rng + ?Sized>(
        &self,
        records: &[TaskRecord],
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<MetricForecast>, ForecastError> {
        self.settings.check_horizon()?;
        let forecasts = Metric::ALL
            .iter()
            .filter_map(|&metric| match self.forecast(metric, records, today, rng) {
                Ok(f) => Some(f),
                Err(e) => {
                    tracing::warn!(error = %e, metric = metric.name(), "forecast unavailable");
                    None
                }
            })
            .collect();
        Ok(forecasts)
    }

    /// Forecast every metric once and condense the results. Metrics that
    /// cannot be forecast are left out of the summary.
    pub fn summary<R: Rng + ?Sized>(
        &self,
        records: &[TaskRecord],
        today: NaiveDate,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Result<ForecastSummary, ForecastError> {
        let forecasts = self.forecast_all(records, today, rng)?;
        Ok(summarize(self.settings.horizon, today, now, &forecasts))
    }
}

fn productivity_outlook(f: &MetricForecast) -> ProductivityOutlook {
    let (best, best_score) = f.peak();
    let (worst, worst_score) = f.trough();
    let delta = f.delta();
    ProductivityOutlook {
        avg_forecast: round1(mean(&f.values)),
        trend: Trend::classify(delta, SCORE_DEAD_ZONE),
        trend_magnitude: round1(delta.abs()),
        best_day: day_name(best),
        best_day_score: round1(best_score),
        worst_day: day_name(worst),
        worst_day_score: round1(worst_score),
    }
}

fn workload_outlook(f: &MetricForecast) -> WorkloadOutlook {
    let (busiest, busiest_minutes) = f.peak();
    WorkloadOutlook {
        total_hours_forecast: round1(f.values.iter().sum::<f64>() / 60.0),
        avg_daily_hours: round1(mean(&f.values) / 60.0),
        trend: Trend::classify(f.delta(), WORKLOAD_DEAD_ZONE),
        busiest_day: day_name(busiest),
        busiest_hours: round1(busiest_minutes / 60.0),
    }
}

fn task_outlook(f: &MetricForecast) -> TaskOutlook {
    let (peak, peak_tasks) = f.peak();
    TaskOutlook {
        total_tasks_forecast: f.values.iter().sum::<f64>() as i64,
        avg_daily_tasks: round1(mean(&f.values)),
        peak_day: day_name(peak),
        peak_tasks: peak_tasks as i64,
    }
}

fn completion_outlook(f: &MetricForecast) -> CompletionOutlook {
    let (best, best_rate) = f.peak();
    CompletionOutlook {
        avg_rate: round1(mean(&f.values)),
        trend: Trend::classify(f.delta(), COMPLETION_DEAD_ZONE).progress_label(),
        best_day: day_name(best),
        best_rate: round1(best_rate),
    }
}

/// Condense per-metric forecasts into a summary with rule-based insights.
pub fn summarize(
    horizon: usize,
    today: NaiveDate,
    now: NaiveDateTime,
    forecasts: &[MetricForecast],
) -> ForecastSummary {
    let find = |metric: Metric| forecasts.iter().find(|f| f.metric == metric);
    let mut summary = ForecastSummary {
        horizon,
        forecast_start: today + Duration::days(1),
        forecast_end: today + Duration::days(horizon as i64),
        generated_at: now,
        productivity: find(Metric::ProductivityScore).map(productivity_outlook),
        workload: find(Metric::Workload).map(workload_outlook),
        tasks: find(Metric::TaskCount).map(task_outlook),
        completion: find(Metric::CompletionRate).map(completion_outlook),
        insights: Vec::new(),
    };
    summary.insights = forecast_insights(&summary);
    summary
}

pub fn forecast_insights(summary: &ForecastSummary) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(p) = &summary.productivity {
        if p.trend_magnitude > 5.0 {
            match p.trend {
                Trend::Decreasing => insights.push(format!(
                    "Productivity may decline by {}%. Consider adjusting workload.",
                    p.trend_magnitude
                )),
                Trend::Increasing => insights.push(format!(
                    "Productivity trending up by {}%. Keep up the momentum!",
                    p.trend_magnitude
                )),
                Trend::Stable => {}
            }
        }
    }

    if let Some(w) = &summary.workload {
        if w.avg_daily_hours > 9.0 {
            insights.push(format!(
                "High workload forecast ({}h/day). Consider planning breaks.",
                w.avg_daily_hours
            ));
        } else if w.avg_daily_hours < 4.0 {
            insights.push(format!(
                "Light schedule forecast ({}h/day). Opportunity to tackle extra goals.",
                w.avg_daily_hours
            ));
        }
    }

    if let Some(c) = &summary.completion {
        if c.avg_rate < 60.0 {
            insights.push(format!(
                "Low completion rate forecast ({}%). Try breaking tasks into smaller chunks.",
                c.avg_rate
            ));
        } else if c.avg_rate > 85.0 {
            insights.push(format!(
                "Excellent completion forecast ({}%)! You're on track.",
                c.avg_rate
            ));
        }
    }

    if let (Some(p), Some(w)) = (&summary.productivity, &summary.workload) {
        if p.best_day == w.busiest_day {
            insights.push(format!(
                "{} looks like your most productive AND busiest day. Schedule important tasks then!",
                p.best_day
            ));
        }
    }

    if insights.is_empty() {
        insights.push(
            "Forecast suggests stable productivity patterns. Maintain your current routine.".into(),
        );
    }
    insights
}
