//! Configuration file loading and default values.

use crate::analytics::score::{ScoreWeights, DEFAULT_PRODUCTIVE_CATEGORIES};
use crate::error::ProdTrackError;
use crate::forecast::ForecastSettings;
use crate::recommend::recommender::RecommendOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PRODTRACK_CONFIG";
pub const DATA_FILE_ENV: &str = "PRODTRACK_DATA_FILE";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub recommend: RecommendOptions,
    pub forecast: ForecastSettings,
    pub display: DisplayConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub productive_categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub file: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            productive_categories: DEFAULT_PRODUCTIVE_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        let file = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("prodtrack")
            .join("tasks.csv");
        Self {
            file: file.to_string_lossy().into_owned(),
        }
    }
}

/// `<config dir>/prodtrack/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("prodtrack")
        .join("config.toml")
}

impl Config {
    /// Load configuration with the resolution order:
    /// CLI args > env vars > config file > defaults.
    pub fn load(config_path: Option<&Path>, data_file: Option<&str>) -> Result<Self, ProdTrackError> {
        let path = config_path
            .map(PathBuf::from)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(default_config_path);
        let path = expand_tilde(&path.to_string_lossy());

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| ProdTrackError::ConfigError(format!("{}: {e}", path.display())))?;
            toml::from_str::<Config>(&content)
                .map_err(|e| ProdTrackError::ConfigError(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };

        if let Some(file) = data_file {
            config.data.file = file.to_string();
        } else if let Ok(file) = std::env::var(DATA_FILE_ENV) {
            config.data.file = file;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ProdTrackError> {
        self.scoring
            .weights
            .validate()
            .map_err(|e| ProdTrackError::ConfigError(format!("[scoring.weights] {e}")))?;
        self.forecast
            .check_horizon()
            .map_err(|e| ProdTrackError::ConfigError(format!("[forecast] {e}")))?;
        self.forecast
            .check_alphas()
            .map_err(|e| ProdTrackError::ConfigError(format!("[forecast] {e}")))?;
        if self.recommend.top_n == 0 {
            return Err(ProdTrackError::ConfigError(
                "[recommend] top_n must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the data file path, expanding `~`.
    pub fn data_file(&self) -> PathBuf {
        expand_tilde(&self.data.file)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        r#"[scoring]
productive_categories = ["Coding", "Academics", "Development", "Project"]

[scoring.weights]
time = 0.7
completion = 0.3

[recommend]
top_n = 3
exclude_completed = true
min_df = 2

[forecast]
horizon = 7
window = 7
score_alpha = 0.4
task_alpha = 0.3
completion_alpha = 0.35
# seed = 42

[display]
color = true

[data]
file = "~/.local/share/prodtrack/tasks.csv"
"#
        .to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_weights() {
        let cfg = Config::default();
        assert!((cfg.scoring.weights.time - 0.7).abs() < f64::EPSILON);
        assert!((cfg.scoring.weights.completion - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.scoring.productive_categories.len(), 4);
    }

    #[test]
    fn default_sections() {
        let cfg = Config::default();
        assert!(cfg.display.color);
        assert_eq!(cfg.recommend.top_n, 3);
        assert_eq!(cfg.forecast.horizon, 7);
        assert!(cfg.data.file.ends_with("tasks.csv"));
    }

    #[test]
    fn default_toml_round_trips_to_defaults() {
        let cfg: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert_eq!(cfg.recommend, RecommendOptions::default());
        assert_eq!(cfg.forecast, ForecastSettings::default());
        assert_eq!(cfg.scoring.weights, ScoreWeights::default());
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[scoring.weights]
time = 0.5
completion = 0.5

[forecast]
seed = 7
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert!((cfg.scoring.weights.time - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.forecast.seed, Some(7));
        assert_eq!(cfg.forecast.window, 7);
        assert_eq!(cfg.scoring.productive_categories.len(), 4);
    }

    #[test]
    fn invalid_weights_are_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring.weights]\ntime = 0.9\ncompletion = 0.3\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn out_of_range_alpha_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[forecast]\nscore_alpha = 1.4\n").unwrap();
        match Config::load(Some(&path), None).unwrap_err() {
            ProdTrackError::ConfigError(msg) => assert!(msg.contains("score_alpha")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display\ncolor = ").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ProdTrackError::ConfigError(_))
        ));
    }

    #[test]
    fn load_nonexistent_config_returns_default() {
        let cfg = Config::load(Some(Path::new("/nonexistent/config.toml")), None).unwrap();
        assert!((cfg.scoring.weights.time - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn data_file_override() {
        let cfg = Config::load(
            Some(Path::new("/nonexistent/config.toml")),
            Some("/tmp/my-tasks.csv"),
        )
        .unwrap();
        assert_eq!(cfg.data_file(), PathBuf::from("/tmp/my-tasks.csv"));
    }

    #[test]
    fn expand_tilde_works() {
        let result = expand_tilde("~/test");
        assert!(!result.to_string_lossy().starts_with("~/"));
    }

    #[test]
    fn expand_absolute_path() {
        let result = expand_tilde("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }
}
