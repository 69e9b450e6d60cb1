//! Error types for trackwav.

/// Result type alias for trackwav operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for trackwav.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Failed to open the input container.
    #[error("failed to open input file '{path}'")]
    InputOpen {
        /// Path to the input file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to read records from the input container.
    #[error("failed to read records from '{path}'")]
    RecordRead {
        /// Path to the input file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Requested stream does not exist in the container.
    #[error("stream '{id}' not found")]
    StreamNotFound {
        /// Identifier of the missing stream.
        id: String,
    },

    /// Failed to create an output segment file.
    #[error("failed to create output file '{path}'")]
    SegmentCreate {
        /// Path to the segment file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write sample data to a segment file.
    #[error("failed to write to output file '{path}'")]
    SegmentWrite {
        /// Path to the segment file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to patch the header of a segment file.
    #[error("failed to finalize output file '{path}'")]
    SegmentFinalize {
        /// Path to the segment file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or flush the JSON summary file.
    #[error("failed to write summary file '{path}'")]
    SummaryIo {
        /// Path to the summary file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the JSON summary.
    #[error("failed to serialize summary to '{path}'")]
    SummaryWrite {
        /// Path to the summary file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Extraction finished with a non-success status.
    #[error("extraction failed: {status}")]
    ExtractionFailed {
        /// Status reported in the summary.
        status: String,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Render the error together with its chain of sources.
    ///
    /// Used for summary status strings, which must name the root cause.
    #[must_use]
    pub fn with_sources(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_sources_includes_cause() {
        let err = Error::SegmentCreate {
            path: "/tmp/x.wav".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.with_sources(),
            "failed to create output file '/tmp/x.wav': denied"
        );
    }

    #[test]
    fn test_with_sources_without_cause() {
        let err = Error::ExtractionFailed {
            status: "No audio track found.".to_string(),
        };
        assert_eq!(err.with_sources(), "extraction failed: No audio track found.");
    }
}
