use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Dates an income statement covers. The end always falls after the start.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReportingPeriod", rename_all = "camelCase")]
pub struct ReportingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReportingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawReportingPeriod> for ReportingPeriod {
    type Error = ConfigurationError;

    fn try_from(raw: RawReportingPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl ReportingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigurationError> {
        if end <= start {
            return Err(ConfigurationError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Income statement for one reporting period. `tax` is the absolute amount
/// paid, not a rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeStatement {
    pub sales: f64,
    pub cogs: f64,
    pub sga: f64,
    pub rd: f64,
    pub depreciation: f64,
    pub amortization: f64,
    pub nonrecurring_cost: f64,
    pub interest: f64,
    pub tax: f64,
    pub period: Option<ReportingPeriod>,
}

impl IncomeStatement {
    /// Depreciation plus amortization.
    pub fn da(&self) -> f64 {
        self.depreciation + self.amortization
    }

    pub fn with_period(self, period: ReportingPeriod) -> Self {
        Self {
            period: Some(period),
            ..self
        }
    }
}
