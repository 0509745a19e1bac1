use serde::{Deserialize, Serialize};

/// Statement of cash flows for one reporting period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CashFlows {
    pub capex: f64,
}
