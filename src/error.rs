// Errors surfaced to callers of the lag operations.

/// Repository code returns `anyhow::Result`; it is wrapped into `StorageUnavailable` at the
/// operation boundary.
#[derive(Debug, thiserror::Error)]
pub enum LagError {
    #[error("{0}")]
    InvalidRange(String),

    #[error(
        "Requested range of {hours:.2}h exceeds raw limit of {limit_hours}h. Use /lag/downsample instead."
    )]
    RangeTooLarge { hours: f64, limit_hours: u32 },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("storage unavailable: {0:#}")]
    StorageUnavailable(anyhow::Error),

    #[error("Forbidden")]
    Forbidden,
}

impl LagError {
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }
}

pub type LagResult<T> = Result<T, LagError>;
