//! Error types for prodtrack.

use thiserror::Error;

/// All error types that can surface from the command layer.
#[derive(Error, Debug)]
pub enum ProdTrackError {
    // Input errors (exit code: 1)
    /// The requested task was not found.
    #[error("Task #{0} does not exist")]
    TaskNotFound(usize),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The new task's interval collides with an existing one on the same date.
    #[error("Task time overlaps with an existing task on this date ({existing}). Please adjust the time.")]
    Overlap { existing: String },

    // Data errors (exit code: 2)
    /// Failed to parse the data file.
    #[error("Failed to parse file: {path}")]
    ParseError {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    // Config errors (exit code: 4)
    /// Failed to read or parse the configuration file.
    #[error("Failed to read configuration: {0}")]
    ConfigError(String),

    // IO errors
    /// A generic I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProdTrackError {
    /// Returns the process exit code for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TaskNotFound(_) | Self::InvalidArgument(_) | Self::Overlap { .. } => 1,

            Self::ParseError { .. } => 2,

            Self::ConfigError(_) => 4,

            Self::Io(_) => 1,
        }
    }

    pub(crate) fn parse(path: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::ParseError {
            path: path.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_input_errors() {
        assert_eq!(ProdTrackError::TaskNotFound(99).exit_code(), 1);
        assert_eq!(ProdTrackError::InvalidArgument("bad".into()).exit_code(), 1);
        assert_eq!(
            ProdTrackError::Overlap {
                existing: "standup 09:00-09:30".into()
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn exit_code_data_errors() {
        let err = ProdTrackError::parse("data.csv", anyhow::anyhow!("bad row"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_code_config_error() {
        assert_eq!(ProdTrackError::ConfigError("bad".into()).exit_code(), 4);
    }

    #[test]
    fn exit_code_io_error() {
        let err = ProdTrackError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not found",
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ProdTrackError::TaskNotFound(42).to_string(),
            "Task #42 does not exist"
        );
        assert!(ProdTrackError::Overlap {
            existing: "x".into()
        }
        .to_string()
        .starts_with("Task time overlaps"));
    }
}
