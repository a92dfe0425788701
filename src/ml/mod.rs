pub mod features;
pub mod forest;
pub mod handler;
pub mod tree;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Not enough data for training (need at least {needed} samples, got {got})")]
    NotEnoughSamples { needed: usize, got: usize },

    /// Stratified splitting needs two members of every class.
    #[error("Too few '{class}' tasks to train on ({count})")]
    ClassTooSmall { class: &'static str, count: usize },
}
