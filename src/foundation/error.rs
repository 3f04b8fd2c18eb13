pub type FramelayResult<T> = Result<T, FramelayError>;

#[derive(thiserror::Error, Debug)]
pub enum FramelayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid render request: {0}")]
    InvalidRequest(String),

    #[error("source frame unavailable")]
    SourceFrameUnavailable,

    #[error("overlay unavailable: {0}")]
    OverlayUnavailable(String),

    #[error("surface allocation failed: {0}")]
    SurfaceAllocation(String),

    #[error("render queue error: {0}")]
    Queue(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramelayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn overlay_unavailable(msg: impl Into<String>) -> Self {
        Self::OverlayUnavailable(msg.into())
    }

    pub fn surface_allocation(msg: impl Into<String>) -> Self {
        Self::SurfaceAllocation(msg.into())
    }

    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }
}
