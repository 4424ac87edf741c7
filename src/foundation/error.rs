/// Convenience result type used across drape.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// Invalid user-provided inputs or parameter ranges. The pipeline never starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Depth provider failure or an unusable depth buffer. Fatal for the run, not retried.
    #[error("depth estimation error: {0}")]
    Depth(String),

    /// A compositing or transform stage hit a dimension mismatch it cannot reconcile.
    #[error("stage error: {0}")]
    Stage(String),

    /// Depth cache read/write failure. The orchestrator treats this as a cache miss.
    #[error("cache error: {0}")]
    Cache(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`DrapeError::Depth`] value.
    pub fn depth(msg: impl Into<String>) -> Self {
        Self::Depth(msg.into())
    }

    /// Build a [`DrapeError::Stage`] value.
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    /// Build a [`DrapeError::Cache`] value.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            DrapeError::invalid_input("x")
                .to_string()
                .contains("invalid input:")
        );
        assert!(
            DrapeError::depth("x")
                .to_string()
                .contains("depth estimation error:")
        );
        assert!(DrapeError::stage("x").to_string().contains("stage error:"));
        assert!(DrapeError::cache("x").to_string().contains("cache error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = DrapeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
