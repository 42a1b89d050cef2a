use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParkingError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request to {endpoint} failed with status {status}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

impl ParkingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ParkingError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ParkingError::Network(_) | ParkingError::HttpStatus { .. } => ErrorCategory::Network,
            ParkingError::Parse { .. } | ParkingError::InvalidInput { .. } => ErrorCategory::Data,
            ParkingError::ConfigValidationError { .. }
            | ParkingError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ParkingError::Io(_) => ErrorCategory::System,
        }
    }

    /// True when the request never produced a response (refused, timed out,
    /// unresolved host). A non-success status is not a transport failure.
    pub fn is_transport(&self) -> bool {
        match self {
            ParkingError::Network(e) => !e.is_status() && !e.is_decode(),
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            // reqwest reports lookup failures as connect errors
            ParkingError::Network(e) if is_unresolved_host(e) => {
                "Cannot reach server. Check your network connection.".to_string()
            }
            ParkingError::Network(e) if e.is_connect() => {
                "Unable to connect to server. Check that the server is running and reachable."
                    .to_string()
            }
            ParkingError::Network(e) if e.is_timeout() => {
                "Connection timeout. Server is taking too long to respond.".to_string()
            }
            ParkingError::Network(_) | ParkingError::HttpStatus { .. } => {
                "Unable to load parking data. Please ensure the server is running.".to_string()
            }
            ParkingError::Parse { .. } => "The server sent data that could not be read.".to_string(),
            ParkingError::InvalidInput { message } => format!("Inconsistent parking data: {}", message),
            ParkingError::ConfigValidationError { .. }
            | ParkingError::InvalidConfigValueError { .. } => format!("Configuration problem: {}", self),
            ParkingError::Io(e) => format!("System error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the base URL and that the parking service is up; the next poll retries automatically",
            ErrorCategory::Data => "Verify the service's response format; the next poll retries automatically",
            ErrorCategory::Configuration => "Fix the reported setting and restart",
            ErrorCategory::System => "Check file permissions and paths",
        }
    }
}

fn is_unresolved_host(e: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        let text = inner.to_string().to_lowercase();
        if text.contains("dns") || text.contains("failed to lookup") {
            return true;
        }
        source = inner.source();
    }
    false
}

pub type Result<T> = std::result::Result<T, ParkingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            ParkingError::invalid_input("duplicate slot").category(),
            ErrorCategory::Data
        );
        assert_eq!(
            ParkingError::HttpStatus {
                endpoint: "lots".to_string(),
                status: 500
            }
            .category(),
            ErrorCategory::Network
        );
        assert_eq!(
            ParkingError::InvalidConfigValueError {
                field: "polling.interval_seconds".to_string(),
                value: "0".to_string(),
                reason: "Value must be at least 1".to_string(),
            }
            .category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_status_is_not_transport() {
        let err = ParkingError::HttpStatus {
            endpoint: "slots".to_string(),
            status: 404,
        };
        assert!(!err.is_transport());
        assert!(err.user_friendly_message().contains("Unable to load parking data"));
    }
}
