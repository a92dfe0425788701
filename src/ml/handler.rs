//! Training and inference for completion and duration models.

use crate::analytics::stats::round1;
use crate::domain::record::TaskRecord;
use crate::ml::features::{CategoricalEncoders, PredictionInput};
use crate::ml::forest::{ForestParams, RandomForest};
use crate::ml::ModelError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const MIN_TRAINING_SAMPLES: usize = 20;
pub const TEST_FRACTION: f64 = 0.25;
pub const SPLIT_SEED: u64 = 42;

pub const DEFAULT_COMPLETION_PROBABILITY: f64 = 50.0;
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

#[derive(Debug, Clone)]
struct Trained {
    forest: RandomForest,
    encoders: CategoricalEncoders,
}

/// Holds trained models across predictions.
#[derive(Debug, Clone, Default)]
pub struct ModelHandler {
    completion: Option<Trained>,
    duration: Option<Trained>,
    pub completion_accuracy: Option<f64>,
    pub duration_mae: Option<f64>,
    params: ForestParams,
}

/// Shuffled train/test index split with `ceil(n * TEST_FRACTION)` test rows.
fn random_split(n: usize, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(rng);
    let n_test = ((n as f64) * TEST_FRACTION).ceil() as usize;
    let train = idx.split_off(n_test);
    (train, idx)
}

/// Split that keeps the class ratio in both halves.
fn stratified_split(labels: &[bool], rng: &mut StdRng) -> Result<(Vec<usize>, Vec<usize>), ModelError> {
    let n = labels.len();
    let n_test = ((n as f64) * TEST_FRACTION).ceil() as usize;
    let mut train = Vec::new();
    let mut test = Vec::new();

    let classes = [false, true];
    let mut allotted = 0;
    for (k, class) in classes.iter().enumerate() {
        let mut members: Vec<usize> = (0..n).filter(|&i| labels[i] == *class).collect();
        if members.len() < 2 {
            return Err(ModelError::ClassTooSmall {
                class: if *class { "completed" } else { "not completed" },
                count: members.len(),
            });
        }
        members.shuffle(rng);
        let share = if k + 1 == classes.len() {
            n_test.saturating_sub(allotted)
        } else {
            ((n_test as f64) * members.len() as f64 / n as f64).round() as usize
        };
        let share = share.clamp(1, members.len() - 1);
        allotted += share;
        let rest = members.split_off(share);
        test.extend(members);
        train.extend(rest);
    }
    Ok((train, test))
}

impl ModelHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: ForestParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn has_completion_model(&self) -> bool {
        self.completion.is_some()
    }

    pub fn has_duration_model(&self) -> bool {
        self.duration.is_some()
    }

    /// Train the completion classifier; returns held-out accuracy.
    pub fn train_completion(&mut self, records: &[TaskRecord]) -> Result<f64, ModelError> {
        if records.len() < MIN_TRAINING_SAMPLES {
            return Err(ModelError::NotEnoughSamples {
                needed: MIN_TRAINING_SAMPLES,
                got: records.len(),
            });
        }
        let encoders = CategoricalEncoders::fit(records);
        let x: Vec<Vec<f64>> = records
            .iter()
            .map(|r| PredictionInput::from(r).completion_row(&encoders))
            .collect();
        let y: Vec<bool> = records.iter().map(|r| r.completed).collect();

        let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
        let (train, test) = stratified_split(&y, &mut rng)?;
        let x_train: Vec<Vec<f64>> = train.iter().map(|&i| x[i].clone()).collect();
        let y_train: Vec<bool> = train.iter().map(|&i| y[i]).collect();

        let forest = RandomForest::fit_classifier(&x_train, &y_train, self.params);
        let correct = test.iter().filter(|&&i| forest.classify(&x[i]) == y[i]).count();
        let accuracy = correct as f64 / test.len() as f64;
        tracing::info!(accuracy, train = train.len(), test = test.len(), "trained completion model");

        self.completion = Some(Trained { forest, encoders });
        self.completion_accuracy = Some(accuracy);
        Ok(accuracy)
    }

    /// Train the duration regressor; returns held-out mean absolute error.
    pub fn train_duration(&mut self, records: &[TaskRecord]) -> Result<f64, ModelError> {
        if records.len() < MIN_TRAINING_SAMPLES {
            return Err(ModelError::NotEnoughSamples {
                needed: MIN_TRAINING_SAMPLES,
                got: records.len(),
            });
        }
        let encoders = CategoricalEncoders::fit(records);
        let x: Vec<Vec<f64>> = records
            .iter()
            .map(|r| PredictionInput::from(r).duration_row(&encoders))
            .collect();
        let y: Vec<f64> = records.iter().map(|r| r.time_taken).collect();

        let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
        let (train, test) = random_split(records.len(), &mut rng);
        let x_train: Vec<Vec<f64>> = train.iter().map(|&i| x[i].clone()).collect();
        let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();

        let forest = RandomForest::fit_regressor(&x_train, &y_train, self.params);
        let mae = test
            .iter()
            .map(|&i| (forest.predict(&x[i]) - y[i]).abs())
            .sum::<f64>()
            / test.len() as f64;
        tracing::info!(mae, train = train.len(), test = test.len(), "trained duration model");

        self.duration = Some(Trained { forest, encoders });
        self.duration_mae = Some(mae);
        Ok(mae)
    }

    /// Completion probability in percent, one decimal.
    pub fn predict_completion_probability(&self, input: &PredictionInput) -> f64 {
        let Some(model) = &self.completion else {
            return DEFAULT_COMPLETION_PROBABILITY;
        };
        let row = input.clone().clamped().completion_row(&model.encoders);
        round1(model.forest.predict(&row) * 100.0)
    }

    /// Minutes, rounded to the nearest 5 and kept within 5..=480.
    pub fn predict_task_duration(&self, input: &PredictionInput) -> u32 {
        let Some(model) = &self.duration else {
            return DEFAULT_DURATION_MINUTES;
        };
        let row = input.clone().clamped().duration_row(&model.encoders);
        let minutes = model.forest.predict(&row);
        if !minutes.is_finite() {
            return DEFAULT_DURATION_MINUTES;
        }
        ((minutes / 5.0).round() * 5.0).clamp(5.0, 480.0) as u32
    }
}
