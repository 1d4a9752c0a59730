use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Error)]
pub enum SimError {
    /// A parameter is outside its valid domain. Raised before any grid is built.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The worker pool for row-block decomposition could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A decomposed run diverged from the single-worker baseline.
    #[error("run with {workers} workers diverged from the sequential baseline")]
    Nondeterministic { workers: usize },
}

impl SimError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
