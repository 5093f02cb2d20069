//! Error taxonomy shared by every core operation.

use thiserror::Error;

/// Errors crossing the public contract boundary of the core.
///
/// Expected failure modes are always returned, never panicked; a
/// unique-constraint race on taxonomy insert is recovered internally
/// and does not appear here.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no sheet identity in URL: {0}")]
    InvalidIdentity(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    #[error("upstream fetch failed ({unit}): {message}")]
    UpstreamFetch { unit: String, message: String },

    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn upstream(unit: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::UpstreamFetch {
            unit: unit.into(),
            message: err.to_string(),
        }
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Short tag used as the `title` of failure reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentity(_) => "invalid identity",
            Self::Validation(_) => "validation error",
            Self::NotFound(_) => "not found",
            Self::Store(_) => "store error",
            Self::UpstreamFetch { .. } => "upstream fetch error",
            Self::Cancelled(_) => "cancelled",
        }
    }
}

/// True when `err` is the store telling us a natural key already exists.
///
/// This is the signal for the ensure-exists paths to re-read the winner
/// instead of propagating the failure.
#[must_use]
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}
