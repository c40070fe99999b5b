use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid page config JSON: {0}")]
    Parse(String),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("Invalid webhook URL: {0}")]
    WebhookUrl(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),
    #[error("Rule {rule} needs an argument")]
    MissingRuleArgument { rule: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Preference storage unavailable")]
    Unavailable,
    #[error("Preference storage rejected the write: {0}")]
    WriteRejected(String),
}

/// Failures of a single lead submission.
///
/// Everything except `Rejected` is a transport problem and may be retried;
/// `Rejected` means the webhook answered `{"ok": false}` on purpose.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Http(u16),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Rejected by webhook: {0}")]
    Rejected(String),
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SubmitError::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rejections_are_final() {
        assert!(SubmitError::Timeout.is_retryable());
        assert!(SubmitError::Http(502).is_retryable());
        assert!(SubmitError::Network("reset".into()).is_retryable());
        assert!(SubmitError::MalformedResponse("eof".into()).is_retryable());
        assert!(!SubmitError::Rejected("spam".into()).is_retryable());
    }
}
