use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Extraction timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True for failures raised while talking to a source: navigation, HTTP,
    /// script evaluation or deadline expiry.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(
            self,
            Error::Extraction(_) | Error::Timeout(_) | Error::Http(_) | Error::InvalidUrl(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_failure_classification() {
        assert!(Error::Extraction("no cards".into()).is_extraction_failure());
        assert!(Error::Timeout(Duration::from_secs(1)).is_extraction_failure());
        assert!(!Error::UnknownSource("nope".into()).is_extraction_failure());
        assert!(!Error::Serialization("bad".into()).is_extraction_failure());
    }

    #[test]
    fn test_display() {
        let err = Error::UnknownSource("slashdot".into());
        assert_eq!(err.to_string(), "Unknown source: slashdot");
    }
}
