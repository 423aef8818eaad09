use thiserror::Error;

/// Failures an operation can run into.
///
/// None of these reach the UI as structured data; the handler turns each one
/// into a notification string.
#[derive(Debug, Error)]
pub enum PosterError {
    #[error("network error: {0}")]
    Network(String),

    #[error("image data is empty")]
    EmptyPayload,

    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    #[error("unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("no suitable poster found")]
    NoCandidate,

    #[error("host error: {0}")]
    Host(String),
}

impl PosterError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::EmptyPayload => "empty_payload",
            Self::InvalidImageData(_) => "invalid_image_data",
            Self::UnsupportedTarget(_) => "unsupported_target",
            Self::NoCandidate => "no_candidate",
            Self::Host(_) => "host_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PosterError::Network("x".into()).code(), "network_error");
        assert_eq!(PosterError::EmptyPayload.code(), "empty_payload");
        assert_eq!(PosterError::NoCandidate.code(), "no_candidate");
        assert_eq!(PosterError::EmptyPayload.to_string(), "image data is empty");
    }
}
