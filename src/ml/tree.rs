//! CART decision trees for binary classification and regression.

use rand::seq::index::sample;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    /// Weighted gini impurity over the classes `0.0` and `1.0`.
    Gini { class_weights: [f64; 2] },
    /// Mean squared error.
    Mse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered at each split, drawn without replacement.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree. Leaves hold the positive-class probability for `Gini`
/// and the mean target for `Mse`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Builder<'a, R: Rng> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    criterion: Criterion,
    params: TreeParams,
    n_features: usize,
    rng: &'a mut R,
    nodes: Vec<Node>,
}

/// Running sums for one side of a split.
#[derive(Debug, Clone, Copy, Default)]
struct Stats {
    count: usize,
    weight: f64,
    // gini: weighted count of class 1; mse: sum of y
    sum: f64,
    // mse: sum of y^2
    sum_sq: f64,
}

impl Stats {
    fn add(&mut self, y: f64, criterion: Criterion) {
        self.count += 1;
        match criterion {
            Criterion::Gini { class_weights } => {
                let w = class_weights[usize::from(y > 0.5)];
                self.weight += w;
                if y > 0.5 {
                    self.sum += w;
                }
            }
            Criterion::Mse => {
                self.weight += 1.0;
                self.sum += y;
                self.sum_sq += y * y;
            }
        }
    }

    fn remove(&mut self, y: f64, criterion: Criterion) {
        self.count -= 1;
        match criterion {
            Criterion::Gini { class_weights } => {
                let w = class_weights[usize::from(y > 0.5)];
                self.weight -= w;
                if y > 0.5 {
                    self.sum -= w;
                }
            }
            Criterion::Mse => {
                self.weight -= 1.0;
                self.sum -= y;
                self.sum_sq -= y * y;
            }
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.weight <= 0.0 {
            return 0.0;
        }
        match criterion {
            Criterion::Gini { .. } => {
                let p = self.sum / self.weight;
                1.0 - p * p - (1.0 - p) * (1.0 - p)
            }
            Criterion::Mse => {
                let mean = self.sum / self.weight;
                (self.sum_sq / self.weight - mean * mean).max(0.0)
            }
        }
    }

    fn value(&self) -> f64 {
        if self.weight <= 0.0 {
            0.0
        } else {
            self.sum / self.weight
        }
    }
}

impl<R: Rng> Builder<'_, R> {
    fn stats(&self, indices: &[usize]) -> Stats {
        let mut stats = Stats::default();
        for &i in indices {
            stats.add(self.y[i], self.criterion);
        }
        stats
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let stats = self.stats(&indices);
        let impurity = stats.impurity(self.criterion);

        let can_split = depth < self.params.max_depth
            && indices.len() >= self.params.min_samples_split
            && indices.len() >= 2 * self.params.min_samples_leaf
            && impurity > f64::EPSILON;

        let split = if can_split {
            self.best_split(&indices, stats, impurity)
        } else {
            None
        };

        let Some((feature, threshold)) = split else {
            self.nodes.push(Node::Leaf {
                value: stats.value(),
            });
            return self.nodes.len() - 1;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][feature] <= threshold);

        let id = self.nodes.len();
        // placeholder, patched once children exist
        self.nodes.push(Node::Leaf { value: 0.0 });
        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    fn best_split(&mut self, indices: &[usize], total: Stats, impurity: f64) -> Option<(usize, f64)> {
        let k = self.params.max_features.clamp(1, self.n_features);
        let features = sample(&mut *self.rng, self.n_features, k);
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted = indices.to_vec();
        for feature in features.iter() {
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left = Stats::default();
            let mut right = total;
            for pos in 0..sorted.len() - 1 {
                let i = sorted[pos];
                left.add(self.y[i], self.criterion);
                right.remove(self.y[i], self.criterion);

                let here = self.x[i][feature];
                let next = self.x[sorted[pos + 1]][feature];
                if next <= here || left.count < min_leaf || right.count < min_leaf {
                    continue;
                }

                let weighted = (left.weight * left.impurity(self.criterion)
                    + right.weight * right.impurity(self.criterion))
                    / total.weight;
                let gain = impurity - weighted;
                if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature, (here + next) / 2.0, gain));
                }
            }
        }
        best.map(|(f, t, _)| (f, t))
    }
}

impl DecisionTree {
    /// Fit on the rows selected by `indices` (duplicates allowed).
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        criterion: Criterion,
        params: TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map_or(0, Vec::len);
        if indices.is_empty() || n_features == 0 {
            return Self {
                nodes: vec![Node::Leaf { value: 0.0 }],
            };
        }
        let mut builder = Builder {
            x,
            y,
            criterion,
            params,
            n_features,
            rng,
            nodes: Vec::new(),
        };
        builder.build(indices, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    id = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}
