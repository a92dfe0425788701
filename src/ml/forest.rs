//! Bootstrap-aggregated random forests.

use crate::ml::tree::{Criterion, DecisionTree, TreeParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn tree_params(&self, max_features: usize) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

/// Weights inversely proportional to class frequency.
pub fn balanced_class_weights(labels: &[bool]) -> [f64; 2] {
    let n = labels.len() as f64;
    let positives = labels.iter().filter(|&&l| l).count() as f64;
    let negatives = n - positives;
    let weight = |count: f64| if count > 0.0 { n / (2.0 * count) } else { 1.0 };
    [weight(negatives), weight(positives)]
}

impl RandomForest {
    fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        criterion: Criterion,
        params: ForestParams,
        max_features: usize,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = x.len();
        let trees = (0..params.n_trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree_rng = StdRng::seed_from_u64(rng.gen());
                DecisionTree::fit(
                    x,
                    y,
                    bootstrap,
                    criterion,
                    params.tree_params(max_features),
                    &mut tree_rng,
                )
            })
            .collect();
        Self { trees }
    }

    /// Balanced class weights and `sqrt(n_features)` candidates per split.
    pub fn fit_classifier(x: &[Vec<f64>], labels: &[bool], params: ForestParams) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let y: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let criterion = Criterion::Gini {
            class_weights: balanced_class_weights(labels),
        };
        Self::fit(x, &y, criterion, params, max_features)
    }

    /// Every feature is a split candidate.
    pub fn fit_regressor(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        Self::fit(x, y, Criterion::Mse, params, n_features)
    }

    /// Mean of the tree outputs: a positive-class probability for
    /// classifiers, a regression estimate otherwise.
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn classify(&self, row: &[f64]) -> bool {
        self.predict(row) >= 0.5
    }
}
