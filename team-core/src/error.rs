/// Transport-level failure of a single catalog request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (offline, CORS, aborted).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("http status {0}")]
    Status(u16),
}

/// A response arrived but its body is not a usable catalog payload.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    #[error("empty response body")]
    Empty,

    #[error("placeholder response body {0:?}")]
    Placeholder(String),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Why one catalog entry could not be produced.
#[derive(thiserror::Error, Debug)]
pub enum EntryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert_eq!(FetchError::Status(404).to_string(), "http status 404");
        assert!(
            FetchError::Network("offline".into())
                .to_string()
                .starts_with("network error:")
        );
        assert_eq!(PayloadError::Empty.to_string(), "empty response body");
    }

    #[test]
    fn entry_error_is_transparent() {
        let err = EntryError::from(FetchError::Status(500));
        assert_eq!(err.to_string(), "http status 500");
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = EntryError::from(PayloadError::from(parse));
        assert!(err.to_string().starts_with("malformed payload:"));
    }
}
