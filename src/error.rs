use std::fmt;

/// Failures at the classification-backend boundary
#[derive(Debug)]
pub enum ClassificationError {
    /// The image file could not be read
    Encoding(std::io::Error),
    /// Transport failure before a status line arrived
    Network(reqwest::Error),
    /// Non-2xx HTTP status
    Http { status: u16, body: String },
    /// 2xx response whose payload reported `success: false`
    Rejected(String),
    /// Response body was not the expected JSON
    Decode(serde_json::Error),
    ModelNotLoaded,
    Busy,
}

impl ClassificationError {
    /// Text shown in the single user-facing alert
    pub fn alert_message(&self) -> String {
        match self {
            ClassificationError::Encoding(_) => "Could not read the captured image.".to_string(),
            ClassificationError::Network(_) => {
                "Could not reach the classification service. Please check your connection.".to_string()
            }
            ClassificationError::Http { status, .. } => {
                format!("Failed to analyze food image (HTTP error! status: {}).", status)
            }
            ClassificationError::Rejected(message) => format!("Failed to analyze food image: {}", message),
            ClassificationError::Decode(_) => "Unexpected response from the classification service.".to_string(),
            ClassificationError::ModelNotLoaded => {
                "The food classification model is not loaded yet. Please try again later.".to_string()
            }
            ClassificationError::Busy => "An analysis is already in progress.".to_string(),
        }
    }
}

impl fmt::Display for ClassificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationError::Encoding(e) => write!(f, "image encoding failed: {}", e),
            ClassificationError::Network(e) => write!(f, "network error: {}", e),
            ClassificationError::Http { status, body } => write!(f, "HTTP error! status: {} ({})", status, body),
            ClassificationError::Rejected(message) => write!(f, "classification rejected: {}", message),
            ClassificationError::Decode(e) => write!(f, "invalid response payload: {}", e),
            ClassificationError::ModelNotLoaded => write!(f, "model not loaded"),
            ClassificationError::Busy => write!(f, "classification already in progress"),
        }
    }
}

impl std::error::Error for ClassificationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClassificationError::Encoding(e) => Some(e),
            ClassificationError::Network(e) => Some(e),
            ClassificationError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClassificationError {
    fn from(err: std::io::Error) -> Self {
        ClassificationError::Encoding(err)
    }
}

impl From<reqwest::Error> for ClassificationError {
    fn from(err: reqwest::Error) -> Self {
        ClassificationError::Network(err)
    }
}

impl From<serde_json::Error> for ClassificationError {
    fn from(err: serde_json::Error) -> Self {
        ClassificationError::Decode(err)
    }
}

pub type ClassificationResult<T> = std::result::Result<T, ClassificationError>;
