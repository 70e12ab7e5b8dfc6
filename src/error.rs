use std::path::PathBuf;

/// Result type for pipeline stages
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures a pipeline stage can report. The caption scan itself never fails.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("No episode URL given and no listing page configured")]
    MissingInput,

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("No element matching '{selector}' with an href on {url}")]
    EpisodeNotFound { url: String, selector: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model call failed: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn network(url: impl Into<String>, err: impl std::fmt::Display) -> Self {
        PipelineError::Network {
            url: url.into(),
            message: err.to_string(),
        }
    }
}
