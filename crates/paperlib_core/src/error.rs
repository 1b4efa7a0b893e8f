//! Application error types for the library client.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Non-success HTTP status (`status` set) or transport failure (`None`).
    #[error("Network error{}: {message}", status_suffix(.status))]
    Network { status: Option<u16>, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced folder is not present in the folder cache.
    #[error("Folder '{folder_id}' no longer exists")]
    MissingFolder { folder_id: String },

    #[error("Folder hierarchy contains a cycle at '{folder_id}'")]
    CycleDetected { folder_id: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl AppError {
    /// Build a transport-level network error (no HTTP status available).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Build a network error for a non-success HTTP status.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns the HTTP status carried by a network error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn network_display_includes_status_when_present() {
        let err = AppError::http_status(404, "Paper not found");
        assert_eq!(err.to_string(), "Network error (404): Paper not found");
        assert_eq!(err.status(), Some(404));

        let err = AppError::transport("connection refused");
        assert_eq!(err.to_string(), "Network error: connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn missing_folder_names_the_folder() {
        let err = AppError::MissingFolder {
            folder_id: "gone".to_string(),
        };
        assert_eq!(err.to_string(), "Folder 'gone' no longer exists");
    }
}
