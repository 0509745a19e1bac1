use chrono::NaiveDate;
use thiserror::Error;

use crate::company::StatementKind;

/// Malformed or inconsistent inputs to a forecast.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error(
        "{assumption} has {found} per-period values, expected {expected} (one per forecast period)"
    )]
    SequenceLength {
        assumption: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("window must be at least one forecast period")]
    EmptyWindow,
    #[error("window of {window} periods is too large to discount")]
    WindowTooLarge { window: usize },
    #[error("base year {base_year} leaves no room for a {window}-period forecast")]
    BaseYearOutOfRange { base_year: i32, window: usize },
    #[error("field '{field}' must be finite")]
    NonFinite { field: &'static str },
    #[error("historical sales are zero; ratios to sales are undefined")]
    ZeroSales,
    #[error("statement period end {end} must be after start {start}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },
}

/// Valuations that are mathematically undefined for the given inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error(
        "terminal discount rate {terminal_discount_rate} must exceed terminal growth rate {terminal_growth_rate}"
    )]
    NonPositiveTerminalSpread {
        terminal_discount_rate: f64,
        terminal_growth_rate: f64,
    },
    #[error("equity is zero; debt to equity is undefined")]
    ZeroEquity,
    #[error("fully diluted share count is zero")]
    ZeroShares,
    #[error("price per share is zero")]
    ZeroPrice,
    #[error("computed {field} is not finite")]
    NonFiniteResult { field: &'static str },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DcfError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("expected a {expected}, found a {found}")]
    StatementKind {
        expected: StatementKind,
        found: StatementKind,
    },
}

pub type Result<T> = std::result::Result<T, DcfError>;

pub(crate) fn ensure_finite(
    field: &'static str,
    value: f64,
) -> std::result::Result<f64, ConfigurationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigurationError::NonFinite { field })
    }
}

/// Same check as [`ensure_finite`] for figures the model computed itself.
pub(crate) fn ensure_finite_result(
    field: &'static str,
    value: f64,
) -> std::result::Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFiniteResult { field })
    }
}
