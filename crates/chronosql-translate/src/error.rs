//! Error types for query translation.
//!
//! # Error Handling Strategy
//!
//! Translation errors form a closed taxonomy: every semantic rule the
//! translator enforces has exactly one [`TranslateError`] variant, and the
//! variant's `Display` text is the diagnostic handed back to the caller.
//! Translation is strict: the first error encountered aborts the statement,
//! and clause translation order makes error precedence observable (a FROM
//! failure is always reported before a WHERE failure, and so on).
//!
//! Callers that need programmatic dispatch use [`TranslateError::code`],
//! which collapses the variants to an [`ErrorCode`] discriminant.

use thiserror::Error;

/// Error raised while translating a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
    #[error("Table does not exist: {0}")]
    TableNotExist(String),
    #[error("Column ambiguously defined: {0}")]
    AmbiguousColumn(String),
    #[error("Invalid function name: {0}")]
    InvalidFunction(String),
    #[error("There mustn't be aggregation")]
    IllegalUseOfAgg,
    #[error("Invalid value type: {0}")]
    WrongValueType(String),
    #[error("Interval cannot be less than 1: {0}")]
    IntervalValueTooSmall(String),
    #[error("Not a GROUP BY expression")]
    GroupByLackExpression,
    #[error("Not SELECTed expression")]
    NotSelectedExpression,
    #[error("Not a single-group group function")]
    NotSingleGroup,
    #[error("ORDER BY item must be the number of a SELECT-list expression")]
    WrongNumberOfSelect,
    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),
    #[error("Tags number not matched")]
    TagsNotMatched,
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Operation not supported: {0}")]
    Unsupported(String),
    #[error("Catalog error for {name}: {message}")]
    Catalog { name: String, message: String },
    #[error("Failed to serialize request: {0}")]
    Serialize(String),
}

/// Machine-readable discriminant of a [`TranslateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidColumn,
    TableNotExist,
    AmbiguousColumn,
    InvalidFunction,
    IllegalUseOfAgg,
    WrongValueType,
    IntervalValueTooSmall,
    GroupByLackExpression,
    NotSelectedExpression,
    NotSingleGroup,
    WrongNumberOfSelect,
    InvalidTagName,
    TagsNotMatched,
    OutOfMemory,
    Unsupported,
    Catalog,
    Serialize,
}

impl TranslateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TranslateError::InvalidColumn(_) => ErrorCode::InvalidColumn,
            TranslateError::TableNotExist(_) => ErrorCode::TableNotExist,
            TranslateError::AmbiguousColumn(_) => ErrorCode::AmbiguousColumn,
            TranslateError::InvalidFunction(_) => ErrorCode::InvalidFunction,
            TranslateError::IllegalUseOfAgg => ErrorCode::IllegalUseOfAgg,
            TranslateError::WrongValueType(_) => ErrorCode::WrongValueType,
            TranslateError::IntervalValueTooSmall(_) => ErrorCode::IntervalValueTooSmall,
            TranslateError::GroupByLackExpression => ErrorCode::GroupByLackExpression,
            TranslateError::NotSelectedExpression => ErrorCode::NotSelectedExpression,
            TranslateError::NotSingleGroup => ErrorCode::NotSingleGroup,
            TranslateError::WrongNumberOfSelect => ErrorCode::WrongNumberOfSelect,
            TranslateError::InvalidTagName(_) => ErrorCode::InvalidTagName,
            TranslateError::TagsNotMatched => ErrorCode::TagsNotMatched,
            TranslateError::OutOfMemory => ErrorCode::OutOfMemory,
            TranslateError::Unsupported(_) => ErrorCode::Unsupported,
            TranslateError::Catalog { .. } => ErrorCode::Catalog,
            TranslateError::Serialize(_) => ErrorCode::Serialize,
        }
    }
}

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;
