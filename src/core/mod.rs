mod assumptions;
mod engine;
mod types;

pub use assumptions::{Assumptions, HistoricalBaseline, SalesRatios};
pub use engine::{DcfModel, discounted_terminal_value};
pub use types::{ForecastRow, ForecastTable, Ratio, Valuation};
