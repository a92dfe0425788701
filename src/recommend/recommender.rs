//! Content-based similar-task recommendations.

use crate::analytics::stats::median;
use crate::domain::record::{
    TaskRecord, DEFAULT_DIFFICULTY, DEFAULT_ENERGY, DEFAULT_FOCUS, DIFFICULTY_RANGE, ENERGY_RANGE,
    FOCUS_RANGE,
};
use crate::recommend::encode::{OneHotEncoder, StandardScaler};
use crate::recommend::text::TfidfModel;
use crate::recommend::RecommendError;
use serde::{Deserialize, Serialize};

pub const MIN_POOL_SIZE: usize = 5;
const SMALL_POOL_DOCS: usize = 10;
const SELF_MATCH_TOLERANCE: f64 = 1e-9;
const UNKNOWN: &str = "unknown";

/// The task to find neighbours for. Every field is optional; numeric levels
/// of `-1` count as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskContext {
    pub task: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub energy_level: Option<f64>,
    pub focus_level: Option<f64>,
    pub difficulty: Option<f64>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub mood: Option<String>,
    pub intent: Option<String>,
}

impl TaskContext {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    fn combined_text(&self) -> String {
        combine_text(
            self.task.as_deref().unwrap_or_default(),
            &self.tags,
            self.notes.as_deref().unwrap_or_default(),
        )
    }

    fn categorical(&self) -> Vec<String> {
        [&self.category, &self.priority, &self.mood, &self.intent]
            .into_iter()
            .map(|v| v.clone().unwrap_or_else(|| UNKNOWN.to_string()))
            .collect()
    }
}

impl From<&TaskRecord> for TaskContext {
    fn from(r: &TaskRecord) -> Self {
        Self {
            task: Some(r.task.clone()),
            tags: r.tags.clone(),
            notes: Some(r.notes.clone()),
            energy_level: Some(f64::from(r.energy_level)),
            focus_level: Some(f64::from(r.focus_level)),
            difficulty: Some(f64::from(r.difficulty)),
            category: Some(r.category.clone()),
            priority: Some(r.priority.to_string()),
            mood: Some(r.mood.to_string()),
            intent: Some(r.intent.to_string()),
        }
    }
}

fn combine_text(task: &str, tags: &[String], notes: &str) -> String {
    format!("{task} {} {notes}", tags.join(" "))
}

fn record_numeric(r: &TaskRecord) -> [f64; 3] {
    [
        f64::from(r.energy_level),
        f64::from(r.focus_level),
        f64::from(r.difficulty),
    ]
}

fn record_categorical(r: &TaskRecord) -> Vec<String> {
    vec![
        r.category.clone(),
        r.priority.to_string(),
        r.mood.to_string(),
        r.intent.to_string(),
    ]
}

fn clip(value: f64, (lo, hi): (u8, u8)) -> f64 {
    value.clamp(f64::from(lo), f64::from(hi))
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != -1.0)
}

/// Encoders fitted on a candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureModel {
    text: TfidfModel,
    scaler: StandardScaler,
    onehot: OneHotEncoder,
    medians: [f64; 3],
}

impl FeatureModel {
    /// Fit on `pool`, returning the model and one feature row per candidate.
    pub fn fit(
        pool: &[&TaskRecord],
        min_df: usize,
    ) -> Result<(Self, Vec<Vec<f64>>), RecommendError> {
        let docs: Vec<String> = pool
            .iter()
            .map(|r| combine_text(&r.task, &r.tags, &r.notes))
            .collect();
        let min_df = if docs.len() < SMALL_POOL_DOCS { 1 } else { min_df.max(1) };
        let (text, text_rows) = TfidfModel::fit(&docs, min_df)?;

        let defaults = [
            f64::from(DEFAULT_ENERGY),
            f64::from(DEFAULT_FOCUS),
            f64::from(DEFAULT_DIFFICULTY),
        ];
        let numeric: Vec<[f64; 3]> = pool.iter().map(|r| record_numeric(r)).collect();
        let mut medians = defaults;
        for (col, m) in medians.iter_mut().enumerate() {
            let column: Vec<f64> = numeric.iter().map(|row| row[col]).collect();
            if !column.is_empty() {
                *m = median(&column);
            }
        }

        let numeric_rows: Vec<Vec<f64>> = numeric.iter().map(|row| clip_row(*row)).collect();
        let scaler = StandardScaler::fit(&numeric_rows);

        let categorical_rows: Vec<Vec<String>> =
            pool.iter().map(|r| record_categorical(r)).collect();
        let onehot = OneHotEncoder::fit(&categorical_rows);

        let model = Self {
            text,
            scaler,
            onehot,
            medians,
        };
        let rows = text_rows
            .into_iter()
            .zip(numeric_rows.iter().zip(&categorical_rows))
            .map(|(text_row, (num, cat))| model.assemble(text_row, num, cat))
            .collect();
        Ok((model, rows))
    }

    /// Encode the context through the fitted encoders.
    pub fn transform(&self, context: &TaskContext) -> Vec<f64> {
        let numeric = clip_row([
            present(context.energy_level).unwrap_or(self.medians[0]),
            present(context.focus_level).unwrap_or(self.medians[1]),
            present(context.difficulty).unwrap_or(self.medians[2]),
        ]);
        let text_row = self.text.transform(&context.combined_text());
        self.assemble(text_row, &numeric, &context.categorical())
    }

    fn assemble(&self, mut row: Vec<f64>, numeric: &[f64], categorical: &[String]) -> Vec<f64> {
        row.extend(self.scaler.transform(numeric));
        row.extend(self.onehot.transform(categorical));
        row
    }
}

fn clip_row([energy, focus, difficulty]: [f64; 3]) -> Vec<f64> {
    vec![
        clip(energy, ENERGY_RANGE),
        clip(focus, FOCUS_RANGE),
        clip(difficulty, DIFFICULTY_RANGE),
    ]
}

/// Cosine similarity; zero vectors give 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Read from the `[recommend]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendOptions {
    pub top_n: usize,
    pub exclude_completed: bool,
    pub min_df: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            top_n: 3,
            exclude_completed: true,
            min_df: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Position of the record in the input slice.
    pub index: usize,
    pub record: TaskRecord,
    pub similarity: f64,
    pub reason: String,
}

fn build_reason(context: &TaskContext, r: &TaskRecord) -> String {
    let mut reasons = Vec::new();
    if context.category.as_deref() == Some(r.category.as_str()) {
        reasons.push("same category");
    }
    if context.priority.as_deref() == Some(r.priority.as_str()) {
        reasons.push("matching priority");
    }
    if context.intent.as_deref() == Some(r.intent.as_str()) {
        reasons.push("similar intent");
    }
    if let Some(d) = context.difficulty {
        if (f64::from(r.difficulty) - d).abs() <= 1.0 {
            reasons.push("similar difficulty");
        }
    }
    if reasons.is_empty() {
        "closest overall match".to_string()
    } else {
        reasons.join(", ")
    }
}

/// Top-N records most similar to `context`, excluding self-matches.
pub fn recommend(
    context: &TaskContext,
    records: &[TaskRecord],
    options: RecommendOptions,
) -> Result<Vec<Recommendation>, RecommendError> {
    let pool: Vec<(usize, &TaskRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !(options.exclude_completed && r.completed))
        .collect();
    if pool.len() < MIN_POOL_SIZE {
        tracing::debug!(pool = pool.len(), "candidate pool too small");
        return Ok(Vec::new());
    }

    let candidates: Vec<&TaskRecord> = pool.iter().map(|(_, r)| *r).collect();
    let (model, rows) = FeatureModel::fit(&candidates, options.min_df)?;
    let query = model.transform(context);

    let mut scored: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i, cosine_similarity(&query, row)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let results = scored
        .into_iter()
        .filter(|(_, s)| (s - 1.0).abs() > SELF_MATCH_TOLERANCE)
        .take(options.top_n)
        .map(|(i, s)| {
            let (index, record) = pool[i];
            Recommendation {
                index,
                record: record.clone(),
                similarity: s.clamp(0.0, 1.0),
                reason: build_reason(context, record),
            }
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Priority;
    use chrono::{NaiveDate, NaiveTime};

    fn record(name: &str, category: &str, priority: Priority, hour: u32) -> TaskRecord {
        let mut r = TaskRecord::new(
            name,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            30.0,
        );
        r.category = category.into();
        r.priority = priority;
        r
    }

    fn pool() -> Vec<TaskRecord> {
        vec![
            record("write api tests", "Coding", Priority::High, 8),
            record("team standup", "Meeting", Priority::Low, 9),
            record("review api docs", "Coding", Priority::High, 10),
            record("morning run", "Exercise", Priority::Medium, 11),
            record("read novel", "Personal", Priority::Low, 12),
            record("grocery shopping", "Errands", Priority::Medium, 13),
        ]
    }

    fn context() -> TaskContext {
        TaskContext {
            task: Some("write api docs".into()),
            ..TaskContext::default()
        }
        .with_category("Coding")
        .with_priority("High")
    }

    #[test]
    fn shared_category_and_priority_rank_first() {
        let recs = recommend(&context(), &pool(), RecommendOptions::default()).unwrap();
        assert_eq!(recs.len(), 3);
        let top: Vec<usize> = recs.iter().take(2).map(|r| r.index).collect();
        assert!(top.contains(&0));
        assert!(top.contains(&2));
        for r in recs.iter().take(2) {
            assert!(r.reason.contains("same category, matching priority"));
        }
    }

    #[test]
    fn scores_sorted_bounded_and_never_self() {
        let records = pool();
        let ctx = TaskContext::from(&records[1]);
        let recs = recommend(
            &ctx,
            &records,
            RecommendOptions {
                top_n: 8,
                ..RecommendOptions::default()
            },
        )
        .unwrap();
        assert!(recs.iter().all(|r| r.index != 1));
        assert!(recs.iter().all(|r| (0.0..=1.0).contains(&r.similarity)));
        assert!(recs.iter().all(|r| r.similarity < 1.0));
        assert!(recs.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn small_pools_return_nothing() {
        let records: Vec<TaskRecord> = pool().into_iter().take(4).collect();
        assert!(recommend(&context(), &records, RecommendOptions::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn pool_of_minimum_size_recommends() {
        let records: Vec<TaskRecord> = pool().into_iter().take(MIN_POOL_SIZE).collect();
        let recs = recommend(&context(), &records, RecommendOptions::default()).unwrap();
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.index < MIN_POOL_SIZE));
    }

    #[test]
    fn completed_tasks_shrink_the_pool() {
        let mut records = pool();
        records[0].completed = true;
        records[1].completed = true;
        assert!(recommend(&context(), &records, RecommendOptions::default())
            .unwrap()
            .is_empty());

        let keep = RecommendOptions {
            exclude_completed: false,
            ..RecommendOptions::default()
        };
        assert!(!recommend(&context(), &records, keep).unwrap().is_empty());
    }

    #[test]
    fn missing_numeric_context_uses_pool_medians() {
        let (model, rows) = FeatureModel::fit(&pool().iter().collect::<Vec<_>>(), 1).unwrap();
        let ctx = TaskContext {
            energy_level: Some(-1.0),
            ..TaskContext::from(&pool()[0])
        };
        assert_eq!(model.transform(&ctx), rows[0]);
    }

    #[test]
    fn reasons() {
        let r = record("x", "Coding", Priority::Low, 8);
        let mut ctx = TaskContext::default().with_category("Admin");
        assert_eq!(build_reason(&ctx, &r), "closest overall match");
        ctx.difficulty = Some(4.0);
        assert_eq!(build_reason(&ctx, &r), "similar difficulty");
        ctx.intent = Some("Complete".into());
        assert_eq!(build_reason(&ctx, &r), "similar intent, similar difficulty");
    }

    #[test]
    fn cosine_of_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
    }
}
