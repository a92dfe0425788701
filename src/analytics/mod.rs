pub mod insights;
pub mod patterns;
pub mod score;
pub mod stats;
pub mod wellbeing;
