use thiserror::Error;

/// Failure reported by an audit sink.
///
/// Sinks signal failure through this type; the engine's dispatcher swallows
/// it and never lets it reach business logic. Adapters wrap their own
/// transport failures here.
#[derive(Debug, Error)]
#[error("audit sink failure: {message}")]
pub struct AuditSinkError {
    message: String,
}

impl AuditSinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for AuditSinkError {
    fn from(e: std::io::Error) -> Self {
        Self::new(format!("io: {}", e))
    }
}

impl From<serde_json::Error> for AuditSinkError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("serialization: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_message() {
        let err = AuditSinkError::new("disk full");
        assert_eq!(err.to_string(), "audit sink failure: disk full");
        assert_eq!(err.message(), "disk full");
    }

    #[test]
    fn converts_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AuditSinkError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
