use axum::http::StatusCode;

/// Domain-specific error types for the pricing service.
/// The pricer itself is total over validated input; it only fails on the
/// distinguished numeric conditions below. The transport maps every variant
/// to a JSON error response and never crashes on malformed input.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid option kind: {0}")]
    InvalidEnum(String),

    #[error(
        "arbitrage inconsistency: risk-neutral probability p={p} outside [0, 1] \
         (d={d}, exp(r*dt)={growth}, u={u})"
    )]
    ArbitrageInconsistency { p: f64, growth: f64, u: f64, d: f64 },

    #[error("numeric overflow: {0}")]
    NumericOverflow(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// HTTP status used when this error reaches the transport.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidParameter(_) | EngineError::InvalidEnum(_) => {
                StatusCode::BAD_REQUEST
            }
            EngineError::ArbitrageInconsistency { .. } | EngineError::NumericOverflow(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::Config(_) | EngineError::Io(_) | EngineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Input rejected before pricing (caller's fault).
    #[inline]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidParameter(_) | EngineError::InvalidEnum(_)
        )
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::InvalidParameter(format!("malformed body: {e}"))
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(e: tokio::task::JoinError) -> Self {
        EngineError::Internal(format!("pricing task failed: {e}"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
