use thiserror::Error;

/// Main error type for the clipforge library
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while opening or decoding source media
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Input file not found or unreadable: {path}")]
    InputNotFound { path: String },

    #[error("Failed to decode media: {path} - {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Failed to probe media metadata: {path} - {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Audio track extraction failed: {reason}")]
    AudioExtractionFailed { reason: String },
}

/// Errors raised inside a single effect stage
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Effect application failed: {effect} - {reason}")]
    ApplyFailed { effect: String, reason: String },

    #[error("Font resource failed to load: {path}")]
    FontLoadFailed { path: String },

    #[error("Invalid effect parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors raised while segmenting or composing the timeline
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Trimming removed every segment (duration {duration:.2}s, split {split:.2}s, trim {trim:.2}s)")]
    EmptySegmentation { duration: f64, split: f64, trim: f64 },

    #[error("Timeline assembly failed: {reason}")]
    AssemblyFailed { reason: String },
}

/// Errors raised while encoding the final artifact
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Encoder not available: {reason}")]
    EncoderUnavailable { reason: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Output write failed: {path} - {reason}")]
    OutputFailed { path: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

impl EditorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// True for the terminal `cancelled` outcome, which is not a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get a user-friendly error message suitable for the job record
    pub fn user_message(&self) -> String {
        match self {
            Self::Media(MediaError::InputNotFound { path }) => {
                format!("Could not open input video '{}'. Please check the file exists.", path)
            }
            Self::Media(MediaError::DecodeFailed { path, .. }) => {
                format!("Could not decode input video '{}'. The file may be corrupt or unsupported.", path)
            }
            Self::Timeline(TimelineError::EmptySegmentation { .. }) => {
                "No segments created: the trim amount removed the entire timeline.".to_string()
            }
            Self::Cancelled => "Job was cancelled".to_string(),
            _ => self.to_string(),
        }
    }
}
