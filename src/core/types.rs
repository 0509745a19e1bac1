use serde::{Deserialize, Serialize};

/// One ratio or growth assumption: the same value for every forecast period,
/// or one value per period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ratio {
    Scalar(f64),
    PerPeriod(Vec<f64>),
}

impl From<f64> for Ratio {
    fn from(value: f64) -> Self {
        Ratio::Scalar(value)
    }
}

impl From<Vec<f64>> for Ratio {
    fn from(values: Vec<f64>) -> Self {
        Ratio::PerPeriod(values)
    }
}

/// One row of the forecast table. The base row has `period == -1` and no
/// discounted cash flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRow {
    pub period: i32,
    pub year: i32,
    pub sales: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub sga: f64,
    pub operating_profit: f64,
    pub rd: f64,
    pub ebitda: f64,
    pub da: f64,
    pub ebit: f64,
    pub interest: f64,
    pub ebt: f64,
    pub taxes: f64,
    pub net_income: f64,
    pub capex: f64,
    pub change_in_nwc: f64,
    pub fcf: f64,
    pub discounted_fcf: Option<f64>,
}

/// Base row followed by one row per forecast period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub(crate) fn new(rows: Vec<ForecastRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn base(&self) -> &ForecastRow {
        &self.rows[0]
    }

    pub fn forecast_rows(&self) -> &[ForecastRow] {
        &self.rows[1..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub discounted_window_cash_flow: f64,
    pub discounted_terminal_cash_flow: f64,
    pub enterprise_value: f64,
    pub net_debt: f64,
    pub equity_value: f64,
    pub equity_value_per_share: f64,
    pub price_per_share: f64,
    pub absolute_upside_per_share: f64,
    pub percent_upside_per_share: f64,
}
