pub mod encode;
pub mod recommender;
pub mod text;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// No term survived tokenization and the document-frequency filter.
    #[error("No usable text to compare tasks with")]
    EmptyVocabulary,
}
