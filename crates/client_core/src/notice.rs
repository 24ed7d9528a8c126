//! User-facing failure notices.

use shared::{
    error::{ApiError, ErrorCode},
    validation::ValidationErrors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeCategory {
    NotFound,
    Validation,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    category: NoticeCategory,
    message: String,
}

impl Notice {
    pub fn new(category: NoticeCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    /// Classifies free-form failure text by keyword.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("not found") {
            NoticeCategory::NotFound
        } else if lower.contains("invalid")
            || lower.contains("required")
            || lower.contains("must be")
            || lower.contains("cannot be")
        {
            NoticeCategory::Validation
        } else if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("unavailable")
        {
            NoticeCategory::Transport
        } else {
            NoticeCategory::Unknown
        };
        Self { category, message }
    }

    pub fn category(&self) -> NoticeCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&ApiError> for Notice {
    fn from(error: &ApiError) -> Self {
        match error.code {
            ErrorCode::NotFound => Self::new(NoticeCategory::NotFound, &error.message),
            ErrorCode::Validation => Self::new(NoticeCategory::Validation, &error.message),
            ErrorCode::Transport => Self::new(NoticeCategory::Transport, &error.message),
            ErrorCode::Internal => Self::from_message(error.message.clone()),
        }
    }
}

impl From<&ValidationErrors> for Notice {
    fn from(errors: &ValidationErrors) -> Self {
        Self::new(NoticeCategory::Validation, errors.to_string())
    }
}

#[cfg(test)]
#[path = "tests/notice_tests.rs"]
mod tests;
