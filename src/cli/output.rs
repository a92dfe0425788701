//! Output formatting for reports (color, plain, JSON).

use crate::analytics::insights::PatternInsights;
use crate::analytics::patterns::{HourStat, WeeklySummary};
use crate::analytics::score::ProductivityScore;
use crate::analytics::wellbeing::{BurnoutRisk, WorkloadAdvice};
use crate::domain::record::TaskRecord;
use crate::forecast::band::BandPoint;
use crate::forecast::series::Metric;
use crate::forecast::summary::{ForecastPoint, ForecastSummary, Method, MetricForecast};
use crate::recommend::recommender::Recommendation;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Color,
    Plain,
    Json,
}

impl OutputFormat {
    pub fn from_flags(json: bool, no_color: bool) -> Self {
        if json {
            Self::Json
        } else if no_color || std::env::var("NO_COLOR").is_ok() {
            Self::Plain
        } else {
            Self::Color
        }
    }
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn heading(text: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Color => text.bold().to_string(),
        _ => text.to_string(),
    }
}

fn rule(format: OutputFormat) -> String {
    match format {
        OutputFormat::Color => "━".repeat(40).dimmed().to_string(),
        _ => "━".repeat(40),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

#[derive(Serialize)]
struct ListedTask<'a> {
    id: usize,
    #[serde(flatten)]
    record: &'a TaskRecord,
}

/// Format a task list; `tasks` pairs each record with its 1-based id.
pub fn format_task_list(tasks: &[(usize, &TaskRecord)], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        let items: Vec<ListedTask> = tasks
            .iter()
            .map(|&(id, record)| ListedTask { id, record })
            .collect();
        return to_json(&items);
    }
    if tasks.is_empty() {
        return "No tasks found. Use 'prodtrack add' to log one.".to_string();
    }

    let mut lines = Vec::new();
    lines.push(format!(
        "{:>4}  {:<10}  {:<5}  {:<30}  {:>6}  {:<14}  {:<8}  {}",
        "#", "Date", "Start", "Task", "Min", "Category", "Priority", "Done"
    ));

    for &(id, r) in tasks {
        let line = format!(
            "{:>4}  {:<10}  {:<5}  {:<30}  {:>6}  {:<14}  {:<8}  {}",
            id,
            r.date,
            r.start_time.format("%H:%M"),
            truncate(&r.task, 30),
            format!("{:.0}", r.time_taken),
            truncate(&r.category, 14),
            r.priority,
            if r.completed { "✓" } else { "" }
        );
        if format == OutputFormat::Color && r.completed {
            lines.push(line.dimmed().to_string());
        } else {
            lines.push(line);
        }
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub productivity: ProductivityScore,
    pub burnout_risk: BurnoutRisk,
    pub today_tasks: usize,
    pub today_completed: usize,
    pub week_tasks: usize,
    pub top_category: Option<(String, usize)>,
    pub category_count: usize,
    pub best_category: Option<(String, f64)>,
}

pub fn format_stats(report: &StatsReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }
    let p = &report.productivity;
    let risk = match (report.burnout_risk, format) {
        (BurnoutRisk::High, OutputFormat::Color) => "High".red().bold().to_string(),
        (BurnoutRisk::Medium, OutputFormat::Color) => "Medium".yellow().to_string(),
        (BurnoutRisk::Low, OutputFormat::Color) => "Low".green().to_string(),
        (risk, _) => risk.to_string(),
    };

    let mut lines = vec![heading("Productivity", format), rule(format)];
    lines.push(format!("Score:           {:.1} / 100", p.score));
    lines.push(format!(
        "Focus time:      {:.0}m / {:.0}m total",
        p.productive_minutes, p.total_minutes
    ));
    lines.push(format!("Completion rate: {:.1}%", p.completion_rate));
    lines.push(format!("Burnout risk:    {risk}"));
    lines.push(String::new());
    lines.push(format!(
        "Today:           {} tasks ({} completed)",
        report.today_tasks, report.today_completed
    ));
    lines.push(format!("This week:       {} tasks", report.week_tasks));
    if let Some((name, count)) = &report.top_category {
        lines.push(format!(
            "Top category:    {name} ({count} tasks, {} categories)",
            report.category_count
        ));
    }
    if let Some((name, rate)) = &report.best_category {
        lines.push(format!("Best category:   {name} ({rate:.0}% done)"));
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    pub peak_hours: Vec<HourStat>,
    pub weekly: WeeklySummary,
    pub workload: WorkloadAdvice,
    pub patterns: PatternInsights,
}

pub fn format_insights(report: &InsightsReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }
    let mut lines = vec![heading("Peak hours", format), rule(format)];
    if report.peak_hours.is_empty() {
        lines.push("Not enough tasks per hour yet.".to_string());
    }
    for h in report.peak_hours.iter().take(5) {
        lines.push(format!("{:<12} {:>6.1}", h.label, h.score));
    }

    lines.push(String::new());
    lines.push(heading("Last 7 days", format));
    lines.push(rule(format));
    if report.weekly.is_empty() {
        lines.push("No tasks logged this week.".to_string());
    } else {
        for d in &report.weekly.days {
            lines.push(format!(
                "{}  {:>5.1}h  {}/{} done ({:.0}%)",
                d.date, d.hours, d.completed, d.total, d.completion_rate
            ));
        }
        lines.push(format!(
            "Total       {:>5.1}h  {}/{} done ({:.0}%)",
            report.weekly.total_hours,
            report.weekly.completed,
            report.weekly.total,
            report.weekly.completion_rate
        ));
    }

    lines.push(String::new());
    lines.push(heading("Workload", format));
    lines.push(rule(format));
    let advice = [
        ("Warning", &report.workload.warning),
        ("Suggestion", &report.workload.suggestion),
        ("Positive", &report.workload.positive),
    ];
    for (label, text) in advice {
        if let Some(text) = text {
            let label = match (label, format) {
                ("Warning", OutputFormat::Color) => label.yellow().to_string(),
                ("Positive", OutputFormat::Color) => label.green().to_string(),
                _ => label.to_string(),
            };
            lines.push(format!("{label}: {text}"));
        }
    }

    lines.push(String::new());
    lines.push(heading("Patterns", format));
    lines.push(rule(format));
    lines.push(report.patterns.status.clone());
    for (label, text) in report.patterns.lines() {
        lines.push(format!("{label}: {text}"));
    }
    lines.join("\n")
}

pub fn format_recommendations(
    source: (usize, &TaskRecord),
    recs: &[Recommendation],
    format: OutputFormat,
) -> String {
    if format == OutputFormat::Json {
        let items: Vec<serde_json::Value> = recs
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.index + 1,
                    "task": r.record.task,
                    "category": r.record.category,
                    "priority": r.record.priority,
                    "similarity": r.similarity,
                    "reason": r.reason,
                })
            })
            .collect();
        return to_json(&items);
    }
    let (id, record) = source;
    let mut lines = vec![heading(&format!("Similar to #{id} {}", record.task), format)];
    lines.push(rule(format));
    if recs.is_empty() {
        lines.push("No close matches yet. Log a few more tasks and try again.".to_string());
    }
    for r in recs {
        let title = format!("#{} {}", r.index + 1, r.record.task);
        let title = match format {
            OutputFormat::Color => title.bold().to_string(),
            _ => title,
        };
        lines.push(format!("{title}  ({:.0}% similar)", r.similarity * 100.0));
        lines.push(format!(
            "   {} | {} | {}",
            r.record.category, r.record.priority, r.reason
        ));
    }
    lines.join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub completion_probability: f64,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_mae: Option<f64>,
    pub notes: Vec<String>,
}

pub fn format_prediction(report: &PredictionReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }
    let mut lines = vec![heading("Prediction", format), rule(format)];
    lines.push(format!(
        "Completion probability: {:.1}%",
        report.completion_probability
    ));
    lines.push(format!(
        "Estimated duration:     {} min",
        report.duration_minutes
    ));
    if let Some(acc) = report.model_accuracy {
        lines.push(format!("Classifier accuracy:    {:.0}%", acc * 100.0));
    }
    if let Some(mae) = report.duration_mae {
        lines.push(format!("Duration error (MAE):   {mae:.1} min"));
    }
    for note in &report.notes {
        let note = match format {
            OutputFormat::Color => note.dimmed().to_string(),
            _ => note.clone(),
        };
        lines.push(note);
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct ForecastJson {
    metric: Metric,
    method: Method,
    history_days: usize,
    points: Vec<BandedPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trend_line: Option<Vec<f64>>,
}

#[derive(Serialize)]
struct BandedPoint {
    #[serde(flatten)]
    point: ForecastPoint,
    lower: f64,
    upper: f64,
}

fn banded(f: &MetricForecast) -> Vec<BandedPoint> {
    f.points()
        .into_iter()
        .zip(f.band())
        .map(|(point, BandPoint { lower, upper })| BandedPoint {
            point,
            lower,
            upper,
        })
        .collect()
}

fn forecast_json(f: &MetricForecast) -> ForecastJson {
    ForecastJson {
        metric: f.metric,
        method: f.method,
        history_days: f.history.as_ref().map_or(0, |h| h.len()),
        points: banded(f),
        trend_line: f.trend_line(),
    }
}

fn format_forecast_block(f: &MetricForecast, format: OutputFormat) -> Vec<String> {
    let mut lines = vec![heading(f.metric.title(), format)];
    if f.method == Method::Fallback {
        lines.push("(limited history, rough estimate)".to_string());
    }
    for p in banded(f) {
        lines.push(format!(
            "{} {}  {:>7.1}  [{:.1} - {:.1}]",
            p.point.date,
            p.point.date.format("%a"),
            p.point.value,
            p.lower,
            p.upper
        ));
    }
    lines
}

pub fn format_forecast(f: &MetricForecast, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return to_json(&forecast_json(f));
    }
    format_forecast_block(f, format).join("\n")
}

pub fn format_forecast_summary(
    summary: &ForecastSummary,
    forecasts: &[MetricForecast],
    format: OutputFormat,
) -> String {
    if format == OutputFormat::Json {
        let metrics: Vec<ForecastJson> = forecasts.iter().map(forecast_json).collect();
        return to_json(&serde_json::json!({
            "summary": summary,
            "forecasts": metrics,
        }));
    }

    let mut lines = vec![
        heading(
            &format!(
                "Forecast {} to {}",
                summary.forecast_start, summary.forecast_end
            ),
            format,
        ),
        rule(format),
    ];
    if let Some(p) = &summary.productivity {
        lines.push(format!(
            "Productivity: avg {:.1}, {} by {:.1}; best {} ({:.1}), worst {} ({:.1})",
            p.avg_forecast,
            p.trend,
            p.trend_magnitude,
            p.best_day,
            p.best_day_score,
            p.worst_day,
            p.worst_day_score
        ));
    }
    if let Some(w) = &summary.workload {
        lines.push(format!(
            "Workload:     {:.1}h total, {:.1}h/day, {}; busiest {} ({:.1}h)",
            w.total_hours_forecast, w.avg_daily_hours, w.trend, w.busiest_day, w.busiest_hours
        ));
    }
    if let Some(t) = &summary.tasks {
        lines.push(format!(
            "Tasks:        {} total, {:.1}/day; peak {} ({})",
            t.total_tasks_forecast, t.avg_daily_tasks, t.peak_day, t.peak_tasks
        ));
    }
    if let Some(c) = &summary.completion {
        lines.push(format!(
            "Completion:   avg {:.1}%, {}; best {} ({:.1}%)",
            c.avg_rate, c.trend, c.best_day, c.best_rate
        ));
    }

    lines.push(String::new());
    lines.push(heading("Insights", format));
    for insight in &summary.insights {
        lines.push(format!("- {insight}"));
    }

    for f in forecasts {
        lines.push(String::new());
        lines.extend(format_forecast_block(f, format));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn record() -> TaskRecord {
        TaskRecord::new(
            "write the quarterly planning document for the team",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            45.0,
        )
    }

    #[test]
    fn empty_list_message() {
        assert!(format_task_list(&[], OutputFormat::Plain).contains("No tasks found"));
        assert_eq!(format_task_list(&[], OutputFormat::Json), "[]");
    }

    #[test]
    fn plain_list_truncates_long_names() {
        let r = record();
        let out = format_task_list(&[(1, &r)], OutputFormat::Plain);
        assert!(out.contains("2025-03-10"));
        assert!(out.contains("..."));
        assert!(out.contains("09:00"));
    }

    #[test]
    fn json_list_carries_ids() {
        let r = record();
        let out = format_task_list(&[(7, &r)], OutputFormat::Json);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["id"], 7);
        assert_eq!(v[0]["start_time"], "2025-03-10 09:00:00");
    }

    #[test]
    fn json_flag_wins() {
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Plain);
    }
}
