use thiserror::Error;

/// Main error type for anf-sample operations
#[derive(Debug, Error)]
pub enum AnfError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Azure API error: {0}")]
    AzureApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid service level '{value}', supported service levels are: Standard, Premium, Ultra")]
    InvalidServiceLevel { value: String },

    #[error("Invalid protocol type '{value}', valid protocol types are: NFSv3, NFSv4.1, CIFS")]
    InvalidProtocol { value: String },

    #[error("Only one protocol type is supported at this time, got {count}")]
    ProtocolCount { count: usize },

    #[error("Timed out waiting for {resource} after {attempts} attempts")]
    Timeout { resource: String, attempts: u32 },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl AnfError {
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::AuthenticationError(msg.into())
    }

    pub fn azure_api<S: Into<String>>(msg: S) -> Self {
        Self::AzureApiError(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_service_level<S: Into<String>>(value: S) -> Self {
        Self::InvalidServiceLevel {
            value: value.into(),
        }
    }

    pub fn invalid_protocol<S: Into<String>>(value: S) -> Self {
        Self::InvalidProtocol {
            value: value.into(),
        }
    }

    pub fn timeout<S: Into<String>>(resource: S, attempts: u32) -> Self {
        Self::Timeout {
            resource: resource.into(),
            attempts,
        }
    }

    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether the error means the target resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for anf-sample operations
pub type Result<T> = std::result::Result<T, AnfError>;

/// Convert Azure Core errors to AnfError
impl From<azure_core::Error> for AnfError {
    fn from(error: azure_core::Error) -> Self {
        Self::AzureApiError(error.to_string())
    }
}
