use thiserror::Error;

/// Errors surfaced by the signal core.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Upstream returned nothing usable for the request.
    #[error("No data: {0}")]
    NoData(String),

    /// The provider cannot serve this capability or timeframe.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Series too short for a window, or a parameter out of range.
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Network, timeout or malformed upstream payload.
    #[error("Provider transport error: {0}")]
    ProviderTransport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SignalError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SignalError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should trigger a failover hop.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            SignalError::NoData(_) | SignalError::Unsupported(_) | SignalError::ProviderTransport(_)
        )
    }

    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalError::NoData(_) => "no_data",
            SignalError::Unsupported(_) => "unsupported",
            SignalError::Validation { .. } => "validation",
            SignalError::ProviderTransport(_) => "transport",
            SignalError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for SignalError {
    fn from(e: reqwest::Error) -> Self {
        SignalError::ProviderTransport(e.to_string())
    }
}

impl From<serde_json::Error> for SignalError {
    fn from(e: serde_json::Error) -> Self {
        SignalError::ProviderTransport(format!("malformed payload: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_classification() {
        assert!(SignalError::NoData("x".into()).is_provider_failure());
        assert!(SignalError::Unsupported("x".into()).is_provider_failure());
        assert!(SignalError::ProviderTransport("x".into()).is_provider_failure());
        assert!(!SignalError::validation("long_window", "too short").is_provider_failure());
        assert!(!SignalError::Config("x".into()).is_provider_failure());
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = SignalError::validation("long_window", "needs 50 bars, got 30");
        assert_eq!(
            err.to_string(),
            "Validation failed for long_window: needs 50 bars, got 30"
        );
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_serde_error_is_transport() {
        let err: SignalError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), "transport");
    }
}
