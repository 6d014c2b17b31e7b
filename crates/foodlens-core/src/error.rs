//! Error types for FoodLens

/// Result type alias using FoodLens's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for FoodLens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Model artifact download errors
    #[error("download error: {0}")]
    Download(String),

    /// Uploaded bytes could not be decoded as an image
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Model weights do not fit the architecture this server builds
    #[error("{0}")]
    IncompatibleModel(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new download error
    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    /// Create a new invalid image error
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new incompatible model error
    pub fn incompatible_model(msg: impl Into<String>) -> Self {
        Self::IncompatibleModel(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the request payload rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidImage(_))
    }
}
