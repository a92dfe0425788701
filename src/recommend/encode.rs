//! Numeric standardization and one-hot encoding fitted on a candidate pool.

use crate::analytics::stats::{mean, std_dev};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Column means and population standard deviations; a constant column
    /// gets scale 1.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let (mean, scale) = (0..width)
            .map(|col| {
                let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
                let sd = std_dev(&column, 0);
                (mean(&column), if sd > 0.0 { sd } else { 1.0 })
            })
            .unzip();
        Self { mean, scale }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

/// One column block per feature, categories sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(rows: &[Vec<String>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let categories = (0..width)
            .map(|col| {
                rows.iter()
                    .map(|r| r[col].clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .collect();
        Self { categories }
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Unseen values encode as all zeros in their block.
    pub fn transform(&self, row: &[String]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        for (value, cats) in row.iter().zip(&self.categories) {
            out.extend(cats.iter().map(|c| if c == value { 1.0 } else { 0.0 }));
        }
        out
    }
}
