//! The one error callers of `latest()` have to handle.

/// No arrivals could be produced.
///
/// Covers an unreachable or unauthorised upstream, an undecodable response,
/// and an upstream that answered but left nothing to show after filtering.
/// The message is meant to be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NoDataError {
    message: String,
}

impl NoDataError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NoDataError::new("No arrivals found");
        assert_eq!(err.to_string(), "No arrivals found");
        assert_eq!(err.message(), "No arrivals found");
    }
}
