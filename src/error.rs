use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Terminal failures of an analysis run.
///
/// Numeric degeneracies (zero denominators, silent windows) are not errors:
/// each computation substitutes its own default and carries on.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("analysis exceeded time limit of {limit:?}")]
    Timeout { limit: Duration },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        AnalysisError::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// True for failures raised by the caller aborting the run.
    pub fn is_abort(&self) -> bool {
        matches!(self, AnalysisError::Cancelled | AnalysisError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_file() {
        let err = AnalysisError::decode("/tmp/song.mp3", "unsupported codec");
        assert_eq!(
            err.to_string(),
            "failed to decode /tmp/song.mp3: unsupported codec"
        );
        assert!(!err.is_abort());
    }

    #[test]
    fn abort_variants() {
        assert!(AnalysisError::Cancelled.is_abort());
        assert!(AnalysisError::Timeout {
            limit: Duration::from_secs(3)
        }
        .is_abort());
        assert!(!AnalysisError::InvalidInput("empty".into()).is_abort());
    }
}
