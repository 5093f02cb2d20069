//! Success/failure envelope returned by mutating and fetching operations.

use crate::error::CoreError;
use serde::Serialize;

/// Uniform outcome envelope. Core functions return `Result<T, CoreError>`;
/// this is the serializable form handed to callers of batch operations,
/// where a missing `data` on failure is expected rather than exceptional.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Report<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            title: None,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            title: Some(title.into()),
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> From<Result<T, CoreError>> for Report<T> {
    fn from(result: Result<T, CoreError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(err.kind(), err.to_string()),
        }
    }
}
