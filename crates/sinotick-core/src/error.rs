use thiserror::Error;

/// Validation and contract errors exposed by `sinotick-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("security code must be exactly 6 digits, got {len}")]
    SymbolBadLength { len: usize },
    #[error("security code contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be YYYY-MM-DD or YYYYMMDD: '{value}'")]
    InvalidDate { value: String },

    #[error("quarter tag must be YYYY0331/YYYY0630/YYYY0930/YYYY1231: '{value}'")]
    InvalidQuarterTag { value: String },
    #[error("start year {start} is after end year {end}")]
    YearOrderReversed { start: i32, end: i32 },

    #[error("invalid adjustment '{value}', expected one of qfq, hfq, none")]
    InvalidAdjustment { value: String },
    #[error("invalid source '{value}', expected one of eastmoney, sina")]
    InvalidSource { value: String },

    #[error("request_id cannot be empty")]
    EmptyRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Align(#[from] crate::align::AlignError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
