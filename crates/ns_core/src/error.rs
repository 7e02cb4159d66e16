use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Storage read error: {0}")]
    StorageRead(String),

    #[error("Storage write error: {0}")]
    StorageWrite(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse failure classes the interface layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    MalformedResponse,
    StorageRead,
    StorageWrite,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(e) if e.is_decode() => ErrorKind::MalformedResponse,
            Error::Http(_) | Error::Api { .. } => ErrorKind::Transport,
            Error::Serialization(_) | Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::Io(_) | Error::StorageRead(_) => ErrorKind::StorageRead,
            Error::StorageWrite(_) => ErrorKind::StorageWrite,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether resubmitting the same query could plausibly succeed.
    ///
    /// Client-side API rejections (bad key, bad parameters) and configuration
    /// problems will fail the same way again; everything else is worth a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            Error::Config(_) => false,
            _ => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            status,
            code: "code".to_string(),
            message: "message".to_string(),
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(api(500).kind(), ErrorKind::Transport);
        assert_eq!(
            Error::MalformedResponse("no articles".to_string()).kind(),
            ErrorKind::MalformedResponse
        );
        assert_eq!(Error::StorageRead("gone".to_string()).kind(), ErrorKind::StorageRead);
        assert_eq!(Error::StorageWrite("full".to_string()).kind(), ErrorKind::StorageWrite);
        let bad_json = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        assert_eq!(Error::from(bad_json).kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_retryable() {
        assert!(!api(401).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(api(429).is_retryable());
        assert!(api(503).is_retryable());
        assert!(Error::MalformedResponse("x".to_string()).is_retryable());
        assert!(!Error::Config("missing key".to_string()).is_retryable());
    }

    #[test]
    fn test_api_display() {
        let err = Error::Api {
            status: 401,
            code: "apiKeyInvalid".to_string(),
            message: "Your API key is invalid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (401): apiKeyInvalid: Your API key is invalid"
        );
    }
}
