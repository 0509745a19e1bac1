use crate::company::Company;
use crate::error::{ConfigurationError, ensure_finite};

use super::types::Ratio;

/// Forward-looking inputs driving a forecast.
///
/// Rates are fractions (`0.03` is 3%). Ratio inputs are shares of the same
/// period's sales.
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub sales_growth: Ratio,
    pub discount_rate: f64,
    /// Rate used in the perpetuity after the window; `discount_rate` when unset.
    pub terminal_discount_rate: Option<f64>,
    pub terminal_growth_rate: f64,
    pub window: usize,
    pub cogs_to_sales: Ratio,
    pub sga_to_sales: Ratio,
    pub rd_to_sales: Ratio,
    pub da_to_sales: Ratio,
    pub interest_to_sales: Ratio,
    pub capex_to_sales: Ratio,
    pub tax_rate: f64,
    pub change_in_nwc_to_change_in_sales: f64,
    /// Year label of the base row.
    pub base_year: Option<i32>,
}

/// Inputs for a forecast that holds the company's latest margins constant.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalBaseline {
    pub sales_growth: Ratio,
    pub discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub change_in_nwc_to_change_in_sales: f64,
    pub tax_rate: f64,
    pub window: usize,
}

/// The six line-item-to-sales ratios of an assumption set.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRatios {
    pub cogs_to_sales: Ratio,
    pub sga_to_sales: Ratio,
    pub rd_to_sales: Ratio,
    pub da_to_sales: Ratio,
    pub interest_to_sales: Ratio,
    pub capex_to_sales: Ratio,
}

/// Assumptions with every per-period input expanded to `window` values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedAssumptions {
    pub window: usize,
    /// `window` as a discount exponent.
    pub periods: i32,
    pub sales_growth: Vec<f64>,
    pub cogs_to_sales: Vec<f64>,
    pub sga_to_sales: Vec<f64>,
    pub rd_to_sales: Vec<f64>,
    pub da_to_sales: Vec<f64>,
    pub interest_to_sales: Vec<f64>,
    pub capex_to_sales: Vec<f64>,
    pub discount_rate: f64,
    pub terminal_discount_rate: f64,
    pub terminal_growth_rate: f64,
    pub tax_rate: f64,
    pub change_in_nwc_to_change_in_sales: f64,
}

impl Ratio {
    /// Expands to exactly `window` values, broadcasting a scalar.
    pub fn per_period(
        &self,
        assumption: &'static str,
        window: usize,
    ) -> Result<Vec<f64>, ConfigurationError> {
        let values = match self {
            Ratio::Scalar(value) => vec![*value; window],
            Ratio::PerPeriod(values) => {
                if values.len() != window {
                    return Err(ConfigurationError::SequenceLength {
                        assumption,
                        expected: window,
                        found: values.len(),
                    });
                }
                values.clone()
            }
        };
        for value in &values {
            ensure_finite(assumption, *value)?;
        }
        Ok(values)
    }
}

impl SalesRatios {
    /// Each line item of the latest filing over its sales, with capex from the
    /// cash flow statement.
    pub fn historical(company: &Company) -> Result<Self, ConfigurationError> {
        let income = company.income_statement();
        let sales = ensure_finite("sales", income.sales)?;
        if sales == 0.0 {
            return Err(ConfigurationError::ZeroSales);
        }

        Ok(Self {
            cogs_to_sales: Ratio::Scalar(income.cogs / sales),
            sga_to_sales: Ratio::Scalar(income.sga / sales),
            rd_to_sales: Ratio::Scalar(income.rd / sales),
            da_to_sales: Ratio::Scalar(income.da() / sales),
            interest_to_sales: Ratio::Scalar(income.interest / sales),
            capex_to_sales: Ratio::Scalar(company.cash_flows().capex / sales),
        })
    }
}

impl Assumptions {
    /// Ratios taken from the company's latest statements.
    pub fn from_historical(
        company: &Company,
        baseline: HistoricalBaseline,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::from_ratios(baseline, SalesRatios::historical(company)?))
    }

    pub fn from_ratios(baseline: HistoricalBaseline, ratios: SalesRatios) -> Self {
        Self {
            sales_growth: baseline.sales_growth,
            discount_rate: baseline.discount_rate,
            terminal_discount_rate: None,
            terminal_growth_rate: baseline.terminal_growth_rate,
            window: baseline.window,
            cogs_to_sales: ratios.cogs_to_sales,
            sga_to_sales: ratios.sga_to_sales,
            rd_to_sales: ratios.rd_to_sales,
            da_to_sales: ratios.da_to_sales,
            interest_to_sales: ratios.interest_to_sales,
            capex_to_sales: ratios.capex_to_sales,
            tax_rate: baseline.tax_rate,
            change_in_nwc_to_change_in_sales: baseline.change_in_nwc_to_change_in_sales,
            base_year: None,
        }
    }

    pub fn terminal_discount_rate(&self) -> f64 {
        self.terminal_discount_rate.unwrap_or(self.discount_rate)
    }

    pub(crate) fn normalize(&self) -> Result<NormalizedAssumptions, ConfigurationError> {
        let window = self.window;
        if window == 0 {
            return Err(ConfigurationError::EmptyWindow);
        }
        let periods =
            i32::try_from(window).map_err(|_| ConfigurationError::WindowTooLarge { window })?;

        Ok(NormalizedAssumptions {
            window,
            periods,
            sales_growth: self.sales_growth.per_period("sales_growth", window)?,
            cogs_to_sales: self.cogs_to_sales.per_period("cogs_to_sales", window)?,
            sga_to_sales: self.sga_to_sales.per_period("sga_to_sales", window)?,
            rd_to_sales: self.rd_to_sales.per_period("rd_to_sales", window)?,
            da_to_sales: self.da_to_sales.per_period("da_to_sales", window)?,
            interest_to_sales: self
                .interest_to_sales
                .per_period("interest_to_sales", window)?,
            capex_to_sales: self.capex_to_sales.per_period("capex_to_sales", window)?,
            discount_rate: ensure_finite("discount_rate", self.discount_rate)?,
            terminal_discount_rate: ensure_finite(
                "terminal_discount_rate",
                self.terminal_discount_rate(),
            )?,
            terminal_growth_rate: ensure_finite("terminal_growth_rate", self.terminal_growth_rate)?,
            tax_rate: ensure_finite("tax_rate", self.tax_rate)?,
            change_in_nwc_to_change_in_sales: ensure_finite(
                "change_in_nwc_to_change_in_sales",
                self.change_in_nwc_to_change_in_sales,
            )?,
        })
    }
}
