use std::fmt::{Display, Formatter};

/// Failure kinds surfaced to the callers of the core operations.
///
/// These are raised as the root cause of an [`anyhow::Error`],
/// so that the outer layers may recover the kind via [`anyhow::Error::downcast_ref`].
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// No readings for the requested entity and period.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// Non-success response or malformed payload from an upstream provider.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// The site geometry was rejected by the forecast provider.
    #[error("validation failure: {0}")]
    ValidationFailure(String),

    /// The cached forecast could not be parsed.
    #[error("cache corruption: {0}")]
    CacheCorruption(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailureKind {
    DataUnavailable,
    UpstreamFailure,
    ValidationFailure,
    CacheCorruption,
}

impl Failure {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::DataUnavailable(_) => FailureKind::DataUnavailable,
            Self::UpstreamFailure(_) => FailureKind::UpstreamFailure,
            Self::ValidationFailure(_) => FailureKind::ValidationFailure,
            Self::CacheCorruption(_) => FailureKind::CacheCorruption,
        }
    }

    #[must_use]
    pub fn kind_of(error: &anyhow::Error) -> Option<FailureKind> {
        error.downcast_ref::<Self>().map(Self::kind)
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataUnavailable => write!(f, "data unavailable"),
            Self::UpstreamFailure => write!(f, "upstream failure"),
            Self::ValidationFailure => write!(f, "validation failure"),
            Self::CacheCorruption => write!(f, "cache corruption"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_wrapped_failure() {
        let error = anyhow::Error::from(Failure::DataUnavailable("sensor.washer".into()))
            .context("failed to record");
        assert_eq!(Failure::kind_of(&error), Some(FailureKind::DataUnavailable));
    }

    #[test]
    fn test_kind_of_foreign_error() {
        assert_eq!(Failure::kind_of(&anyhow::anyhow!("boom")), None);
    }
}
