use std::cell::OnceCell;

use chrono::{Datelike, Local};
use tracing::{debug, info};

use crate::company::Company;
use crate::error::{ConfigurationError, DomainError, Result, ensure_finite, ensure_finite_result};

use super::assumptions::{Assumptions, NormalizedAssumptions};
use super::types::{ForecastRow, ForecastTable, Valuation};

/// Discounted cash flow model over one company and one assumption set.
///
/// The forecast table is built on first use and cached until the assumptions
/// are replaced. A failed build leaves nothing cached.
#[derive(Debug)]
pub struct DcfModel<'a> {
    company: &'a Company,
    assumptions: Assumptions,
    table: OnceCell<ForecastTable>,
}

/// Historical figures the base row is filled from.
#[derive(Debug, Clone, Copy)]
struct HistoricalActuals {
    sales: f64,
    costs: CostLines,
    tax: f64,
}

#[derive(Debug, Clone, Copy)]
struct CostLines {
    cogs: f64,
    sga: f64,
    rd: f64,
    da: f64,
    interest: f64,
    capex: f64,
}

#[derive(Debug, Clone, Copy)]
enum TaxBasis {
    Rate(f64),
    Actual(f64),
}

impl HistoricalActuals {
    fn from_company(company: &Company) -> std::result::Result<Self, ConfigurationError> {
        let income = company.income_statement();
        let depreciation = ensure_finite("depreciation", income.depreciation)?;
        let amortization = ensure_finite("amortization", income.amortization)?;
        Ok(Self {
            sales: ensure_finite("sales", income.sales)?,
            costs: CostLines {
                cogs: ensure_finite("cogs", income.cogs)?,
                sga: ensure_finite("sga", income.sga)?,
                rd: ensure_finite("rd", income.rd)?,
                da: depreciation + amortization,
                interest: ensure_finite("interest", income.interest)?,
                capex: ensure_finite("capex", company.cash_flows().capex)?,
            },
            tax: ensure_finite("tax", income.tax)?,
        })
    }
}

impl CostLines {
    fn from_ratios(inputs: &NormalizedAssumptions, period: usize, sales: f64) -> Self {
        Self {
            cogs: inputs.cogs_to_sales[period] * sales,
            sga: inputs.sga_to_sales[period] * sales,
            rd: inputs.rd_to_sales[period] * sales,
            da: inputs.da_to_sales[period] * sales,
            interest: inputs.interest_to_sales[period] * sales,
            capex: inputs.capex_to_sales[period] * sales,
        }
    }
}

impl<'a> DcfModel<'a> {
    pub fn new(company: &'a Company, assumptions: Assumptions) -> Self {
        Self {
            company,
            assumptions,
            table: OnceCell::new(),
        }
    }

    pub fn company(&self) -> &'a Company {
        self.company
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Replaces the assumptions and drops any cached forecast.
    pub fn set_assumptions(&mut self, assumptions: Assumptions) {
        self.assumptions = assumptions;
        self.table = OnceCell::new();
    }

    pub fn is_forecast(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn forecast(&self) -> Result<&ForecastTable> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let table = build_forecast(self.company, &self.assumptions)?;
        Ok(self.table.get_or_init(|| table))
    }

    /// Sum of discounted free cash flow over the forecast periods.
    pub fn discounted_window_cash_flow(&self) -> Result<f64> {
        let table = self.forecast()?;
        let total = table
            .forecast_rows()
            .iter()
            .filter_map(|row| row.discounted_fcf)
            .sum();
        Ok(ensure_finite_result("discounted_window_cash_flow", total)?)
    }

    /// Present value of cash flows after the window.
    pub fn discounted_terminal_cash_flow(&self) -> Result<f64> {
        let table = self.forecast()?;
        let last_discounted_fcf = table
            .forecast_rows()
            .last()
            .and_then(|row| row.discounted_fcf)
            .unwrap_or_default();
        let window = self.assumptions.window;
        let periods =
            i32::try_from(window).map_err(|_| ConfigurationError::WindowTooLarge { window })?;
        let value = discounted_terminal_value(
            last_discounted_fcf,
            self.assumptions.terminal_growth_rate,
            self.assumptions.terminal_discount_rate(),
            self.assumptions.discount_rate,
            periods,
        )?;
        Ok(ensure_finite_result("discounted_terminal_cash_flow", value)?)
    }

    pub fn enterprise_value(&self) -> Result<f64> {
        let value = self.discounted_window_cash_flow()? + self.discounted_terminal_cash_flow()?;
        Ok(ensure_finite_result("enterprise_value", value)?)
    }

    pub fn equity_value(&self) -> Result<f64> {
        let net_debt = ensure_finite("net_debt", self.company.balance_sheet().net_debt())?;
        let value = self.enterprise_value()? - net_debt;
        Ok(ensure_finite_result("equity_value", value)?)
    }

    pub fn equity_value_per_share(&self) -> Result<f64> {
        let shares = ensure_finite("fully_diluted_shares", self.company.fully_diluted_shares())?;
        if shares == 0.0 {
            return Err(DomainError::ZeroShares.into());
        }
        let value = self.equity_value()? / shares;
        Ok(ensure_finite_result("equity_value_per_share", value)?)
    }

    pub fn absolute_upside_per_share(&self) -> Result<f64> {
        let price = ensure_finite("price_per_share", self.company.price_per_share())?;
        let value = self.equity_value_per_share()? - price;
        Ok(ensure_finite_result("absolute_upside_per_share", value)?)
    }

    pub fn percent_upside_per_share(&self) -> Result<f64> {
        let price = ensure_finite("price_per_share", self.company.price_per_share())?;
        if price == 0.0 {
            return Err(DomainError::ZeroPrice.into());
        }
        let value = self.absolute_upside_per_share()? / price;
        Ok(ensure_finite_result("percent_upside_per_share", value)?)
    }

    /// Every valuation figure at once.
    pub fn valuation(&self) -> Result<Valuation> {
        let discounted_window_cash_flow = self.discounted_window_cash_flow()?;
        let discounted_terminal_cash_flow = self.discounted_terminal_cash_flow()?;
        let valuation = Valuation {
            discounted_window_cash_flow,
            discounted_terminal_cash_flow,
            enterprise_value: self.enterprise_value()?,
            net_debt: self.company.balance_sheet().net_debt(),
            equity_value: self.equity_value()?,
            equity_value_per_share: self.equity_value_per_share()?,
            price_per_share: self.company.price_per_share(),
            absolute_upside_per_share: self.absolute_upside_per_share()?,
            percent_upside_per_share: self.percent_upside_per_share()?,
        };
        info!(
            enterprise_value = valuation.enterprise_value,
            equity_value_per_share = valuation.equity_value_per_share,
            percent_upside = valuation.percent_upside_per_share,
            "valuation derived"
        );
        Ok(valuation)
    }
}

/// Gordon growth terminal value of the last discounted cash flow, brought
/// back to today over `periods` periods.
pub fn discounted_terminal_value(
    last_discounted_fcf: f64,
    terminal_growth_rate: f64,
    terminal_discount_rate: f64,
    discount_rate: f64,
    periods: i32,
) -> std::result::Result<f64, DomainError> {
    let spread = terminal_discount_rate - terminal_growth_rate;
    if spread <= 0.0 || spread.is_nan() {
        return Err(DomainError::NonPositiveTerminalSpread {
            terminal_discount_rate,
            terminal_growth_rate,
        });
    }
    let value_at_window = last_discounted_fcf * (1.0 + terminal_growth_rate) / spread;
    Ok(value_at_window / (1.0 + discount_rate).powi(periods))
}

fn build_forecast(company: &Company, assumptions: &Assumptions) -> Result<ForecastTable> {
    let inputs = assumptions.normalize()?;
    let actuals = HistoricalActuals::from_company(company)?;
    let base_year = resolve_base_year(company, assumptions);
    if base_year.checked_add(inputs.periods).is_none() {
        return Err(ConfigurationError::BaseYearOutOfRange {
            base_year,
            window: inputs.window,
        }
        .into());
    }

    let sales = project_sales(actuals.sales, &inputs.sales_growth);
    let mut rows = Vec::with_capacity(inputs.window + 1);
    let base_row = base_period_row(&actuals, base_year);
    ensure_row_finite(&base_row)?;
    rows.push(base_row);

    let mut prior_sales = actuals.sales;
    // `periods` fits in i32 and `base_year + periods` was checked above.
    for ((index, &period_sales), period) in sales.iter().enumerate().zip(0..inputs.periods) {
        let costs = CostLines::from_ratios(&inputs, index, period_sales);
        let change_in_nwc = (period_sales - prior_sales) * inputs.change_in_nwc_to_change_in_sales;
        let mut row = income_row(
            period,
            base_year + 1 + period,
            period_sales,
            costs,
            TaxBasis::Rate(inputs.tax_rate),
            change_in_nwc,
        );
        row.discounted_fcf = Some(row.fcf / (1.0 + inputs.discount_rate).powi(period));
        ensure_row_finite(&row)?;
        rows.push(row);
        prior_sales = period_sales;
    }

    debug!(
        window = inputs.window,
        base_year,
        base_sales = actuals.sales,
        "forecast table built"
    );
    Ok(ForecastTable::new(rows))
}

/// Rejects a row whose figures overflowed or lost meaning (for example
/// infinite sales minus infinite costs).
fn ensure_row_finite(row: &ForecastRow) -> std::result::Result<(), DomainError> {
    let fields = [
        ("sales", row.sales),
        ("cogs", row.cogs),
        ("gross_profit", row.gross_profit),
        ("sga", row.sga),
        ("operating_profit", row.operating_profit),
        ("rd", row.rd),
        ("ebitda", row.ebitda),
        ("da", row.da),
        ("ebit", row.ebit),
        ("interest", row.interest),
        ("ebt", row.ebt),
        ("taxes", row.taxes),
        ("net_income", row.net_income),
        ("capex", row.capex),
        ("change_in_nwc", row.change_in_nwc),
        ("fcf", row.fcf),
        ("discounted_fcf", row.discounted_fcf.unwrap_or_default()),
    ];
    for (field, value) in fields {
        ensure_finite_result(field, value)?;
    }
    Ok(())
}

/// Compounds base sales by each period's growth rate in turn.
fn project_sales(base_sales: f64, growth: &[f64]) -> Vec<f64> {
    growth
        .iter()
        .scan(base_sales, |sales, rate| {
            *sales *= 1.0 + rate;
            Some(*sales)
        })
        .collect()
}

/// The base row restates the latest filing: historical cost lines, the tax
/// actually paid, and no working capital change.
fn base_period_row(actuals: &HistoricalActuals, base_year: i32) -> ForecastRow {
    income_row(
        -1,
        base_year,
        actuals.sales,
        actuals.costs,
        TaxBasis::Actual(actuals.tax),
        0.0,
    )
}

fn income_row(
    period: i32,
    year: i32,
    sales: f64,
    costs: CostLines,
    tax: TaxBasis,
    change_in_nwc: f64,
) -> ForecastRow {
    let gross_profit = sales - costs.cogs;
    let operating_profit = gross_profit - costs.sga;
    let ebitda = operating_profit - costs.rd;
    let ebit = ebitda - costs.da;
    let ebt = ebit - costs.interest;
    let taxes = match tax {
        TaxBasis::Rate(rate) => ebt * rate,
        TaxBasis::Actual(amount) => amount,
    };
    let net_income = ebt - taxes;
    let fcf = net_income + costs.da - costs.capex - change_in_nwc;

    ForecastRow {
        period,
        year,
        sales,
        cogs: costs.cogs,
        gross_profit,
        sga: costs.sga,
        operating_profit,
        rd: costs.rd,
        ebitda,
        da: costs.da,
        ebit,
        interest: costs.interest,
        ebt,
        taxes,
        net_income,
        capex: costs.capex,
        change_in_nwc,
        fcf,
        discounted_fcf: None,
    }
}

fn resolve_base_year(company: &Company, assumptions: &Assumptions) -> i32 {
    assumptions
        .base_year
        .or_else(|| {
            company
                .income_statement()
                .period
                .map(|period| period.end().year())
        })
        .unwrap_or_else(|| Local::now().year() - 1)
}
