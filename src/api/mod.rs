use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::company::{Company, Statement};
use crate::core::{
    Assumptions, DcfModel, ForecastTable, HistoricalBaseline, Ratio, SalesRatios, Valuation,
};
use crate::error::DcfError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputMode {
    Summary,
    Forecast,
    Full,
}

#[derive(Parser, Debug)]
#[command(
    name = "dcf",
    about = "Discounted cash flow valuation from a company's latest statements"
)]
pub struct Cli {
    #[arg(long, help = "Company JSON document")]
    company: PathBuf,
    #[arg(
        long,
        help = "Assumptions JSON document; its fields override the flags below"
    )]
    assumptions: Option<PathBuf>,
    #[arg(long, default_value_t = 0.03, allow_negative_numbers = true)]
    sales_growth: f64,
    #[arg(long, default_value_t = 0.10)]
    discount_rate: f64,
    #[arg(long, help = "Discount rate after the window; defaults to --discount-rate")]
    terminal_discount_rate: Option<f64>,
    #[arg(long, default_value_t = 0.03, allow_negative_numbers = true)]
    terminal_growth_rate: f64,
    #[arg(long, default_value_t = 5, help = "Forecast periods after the base year")]
    window: usize,
    #[arg(long, default_value_t = 0.21)]
    tax_rate: f64,
    #[arg(
        long = "nwc-to-sales",
        default_value_t = 0.1,
        help = "Change in net working capital per unit change in sales"
    )]
    change_in_nwc_to_change_in_sales: f64,
    #[arg(long)]
    base_year: Option<i32>,
    #[arg(long, value_enum, default_value_t = OutputMode::Summary)]
    output: OutputMode,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Dcf(#[from] DcfError),

    #[error("invalid JSON document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Dcf(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io { .. } => 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyDocument {
    fully_diluted_shares: f64,
    price_per_share: f64,
    balance_sheet: Statement,
    cash_flows: Statement,
    income_statement: Statement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AssumptionsPayload {
    sales_growth: Option<Ratio>,
    discount_rate: Option<f64>,
    terminal_discount_rate: Option<f64>,
    terminal_growth_rate: Option<f64>,
    window: Option<usize>,

    cogs_to_sales: Option<Ratio>,
    sga_to_sales: Option<Ratio>,
    rd_to_sales: Option<Ratio>,
    da_to_sales: Option<Ratio>,
    interest_to_sales: Option<Ratio>,
    capex_to_sales: Option<Ratio>,

    tax_rate: Option<f64>,
    #[serde(alias = "nwcToSales")]
    change_in_nwc_to_change_in_sales: Option<f64>,
    base_year: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValuationResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    valuation: Option<Valuation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    forecast: Option<&'a ForecastTable>,
}

/// Runs one valuation and renders it as JSON.
pub fn run(cli: Cli) -> Result<String, CliError> {
    let company = company_from_json(&read_document(&cli.company)?)?;
    let payload = match &cli.assumptions {
        Some(path) => payload_from_json(&read_document(path)?)?,
        None => AssumptionsPayload::default(),
    };
    let output = cli.output;
    let assumptions = build_assumptions(&cli, payload, &company)?;
    debug!(?assumptions, "assumptions resolved");

    let model = DcfModel::new(&company, assumptions);
    let response = ValuationResponse {
        valuation: match output {
            OutputMode::Summary | OutputMode::Full => Some(model.valuation()?),
            OutputMode::Forecast => None,
        },
        forecast: match output {
            OutputMode::Forecast | OutputMode::Full => Some(model.forecast()?),
            OutputMode::Summary => None,
        },
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

fn read_document(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn company_from_json(json: &str) -> Result<Company, CliError> {
    let document = serde_json::from_str::<CompanyDocument>(json)?;
    let company = Company::from_statements(
        document.fully_diluted_shares,
        document.price_per_share,
        document.balance_sheet,
        document.cash_flows,
        document.income_statement,
    )?;
    Ok(company)
}

fn payload_from_json(json: &str) -> Result<AssumptionsPayload, CliError> {
    Ok(serde_json::from_str::<AssumptionsPayload>(json)?)
}

/// Flags first, then document fields on top. Ratios the document leaves out
/// hold the company's latest margins.
fn build_assumptions(
    cli: &Cli,
    payload: AssumptionsPayload,
    company: &Company,
) -> Result<Assumptions, DcfError> {
    let baseline = HistoricalBaseline {
        sales_growth: payload
            .sales_growth
            .unwrap_or(Ratio::Scalar(cli.sales_growth)),
        discount_rate: payload.discount_rate.unwrap_or(cli.discount_rate),
        terminal_growth_rate: payload
            .terminal_growth_rate
            .unwrap_or(cli.terminal_growth_rate),
        change_in_nwc_to_change_in_sales: payload
            .change_in_nwc_to_change_in_sales
            .unwrap_or(cli.change_in_nwc_to_change_in_sales),
        tax_rate: payload.tax_rate.unwrap_or(cli.tax_rate),
        window: payload.window.unwrap_or(cli.window),
    };
    // The filing is only consulted for ratios the document leaves out.
    let ratios = match (
        payload.cogs_to_sales,
        payload.sga_to_sales,
        payload.rd_to_sales,
        payload.da_to_sales,
        payload.interest_to_sales,
        payload.capex_to_sales,
    ) {
        (Some(cogs), Some(sga), Some(rd), Some(da), Some(interest), Some(capex)) => SalesRatios {
            cogs_to_sales: cogs,
            sga_to_sales: sga,
            rd_to_sales: rd,
            da_to_sales: da,
            interest_to_sales: interest,
            capex_to_sales: capex,
        },
        (cogs, sga, rd, da, interest, capex) => {
            let historical = SalesRatios::historical(company)?;
            SalesRatios {
                cogs_to_sales: cogs.unwrap_or(historical.cogs_to_sales),
                sga_to_sales: sga.unwrap_or(historical.sga_to_sales),
                rd_to_sales: rd.unwrap_or(historical.rd_to_sales),
                da_to_sales: da.unwrap_or(historical.da_to_sales),
                interest_to_sales: interest.unwrap_or(historical.interest_to_sales),
                capex_to_sales: capex.unwrap_or(historical.capex_to_sales),
            }
        }
    };

    let mut assumptions = Assumptions::from_ratios(baseline, ratios);
    assumptions.terminal_discount_rate = payload
        .terminal_discount_rate
        .or(cli.terminal_discount_rate);
    assumptions.base_year = payload.base_year.or(cli.base_year);

    Ok(assumptions)
}
