use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Balance sheet at a single point in time.
///
/// Line items are grouped the way filings group them. Subtotals, equity and
/// net debt are derived on read so they always agree with the line items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BalanceSheet {
    pub cash: f64,
    pub short_term_investments: f64,
    pub net_receivables: f64,
    pub inventory: f64,
    pub other_current_assets: f64,

    pub ppe: f64,
    pub goodwill: f64,
    pub intangible_assets: f64,
    pub other_lt_assets: f64,

    pub accounts_payable: f64,
    pub accrued_liabilities: f64,
    pub short_term_debt: f64,
    pub current_part_lt_debt: f64,
    pub other_current_liabilities: f64,

    pub long_term_debt: f64,
    pub other_lt_liabilities: f64,
    pub deferred_lt_liabilities: f64,
    pub minority_interest: f64,

    /// Share of `other_lt_liabilities` treated as debt in `net_debt`.
    pub other_lt_liability_debt_percent: f64,
    pub date: Option<NaiveDate>,
}

impl BalanceSheet {
    pub fn current_assets(&self) -> f64 {
        self.cash
            + self.short_term_investments
            + self.net_receivables
            + self.inventory
            + self.other_current_assets
    }

    pub fn long_term_assets(&self) -> f64 {
        self.ppe + self.goodwill + self.intangible_assets + self.other_lt_assets
    }

    pub fn assets(&self) -> f64 {
        self.current_assets() + self.long_term_assets()
    }

    pub fn current_liabilities(&self) -> f64 {
        self.accounts_payable
            + self.accrued_liabilities
            + self.short_term_debt
            + self.current_part_lt_debt
            + self.other_current_liabilities
    }

    pub fn long_term_liabilities(&self) -> f64 {
        self.long_term_debt
            + self.other_lt_liabilities
            + self.deferred_lt_liabilities
            + self.minority_interest
    }

    pub fn liabilities(&self) -> f64 {
        self.current_liabilities() + self.long_term_liabilities()
    }

    pub fn equity(&self) -> f64 {
        self.assets() - self.liabilities()
    }

    pub fn debt_to_equity(&self) -> Result<f64, DomainError> {
        let equity = self.equity();
        if equity == 0.0 {
            return Err(DomainError::ZeroEquity);
        }
        Ok(self.liabilities() / equity)
    }

    /// Debt net of cash. Only `other_lt_liabilities` is weighted into debt;
    /// deferred liabilities and minority interest never are.
    pub fn net_debt(&self) -> f64 {
        self.short_term_debt
            + self.long_term_debt
            + self.other_lt_liability_debt_percent * self.other_lt_liabilities
            - self.cash
            - self.short_term_investments
    }

    pub fn with_date(self, date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    // Assets 11,000 (5,000 current); liabilities 5,000 (4,000 current).
    fn filing_balance_sheet() -> BalanceSheet {
        BalanceSheet {
            cash: 1000.0,
            short_term_investments: 1000.0,
            net_receivables: 2000.0,
            inventory: 500.0,
            other_current_assets: 500.0,
            ppe: 3000.0,
            goodwill: 1000.0,
            intangible_assets: 2000.0,
            other_lt_assets: 0.0,
            accounts_payable: 500.0,
            accrued_liabilities: 900.0,
            short_term_debt: 600.0,
            current_part_lt_debt: 400.0,
            other_current_liabilities: 1600.0,
            long_term_debt: 0.0,
            other_lt_liabilities: 200.0,
            deferred_lt_liabilities: 300.0,
            minority_interest: 500.0,
            other_lt_liability_debt_percent: 0.0,
            date: None,
        }
    }

    #[test]
    fn subtotals_roll_up_line_items() {
        let sheet = filing_balance_sheet();
        assert_approx(sheet.current_assets(), 5000.0);
        assert_approx(sheet.long_term_assets(), 6000.0);
        assert_approx(sheet.assets(), 11_000.0);
        assert_approx(sheet.current_liabilities(), 4000.0);
        assert_approx(sheet.long_term_liabilities(), 1000.0);
        assert_approx(sheet.liabilities(), 5000.0);
        assert_approx(sheet.equity(), 6000.0);
    }

    #[test]
    fn debt_to_equity_divides_liabilities_by_equity() {
        let sheet = BalanceSheet {
            cash: 400.0,
            accounts_payable: 300.0,
            ..BalanceSheet::default()
        };
        assert_approx(sheet.debt_to_equity().expect("nonzero equity"), 3.0);
    }

    #[test]
    fn debt_to_equity_rejects_zero_equity() {
        let sheet = BalanceSheet {
            cash: 50.0,
            accounts_payable: 50.0,
            ..BalanceSheet::default()
        };
        assert_eq!(sheet.debt_to_equity(), Err(DomainError::ZeroEquity));
    }

    #[test]
    fn net_debt_weights_only_other_long_term_liabilities() {
        let sheet = BalanceSheet {
            short_term_debt: 6.0,
            long_term_debt: 14.0,
            cash: 10.0,
            short_term_investments: 10.0,
            other_lt_liability_debt_percent: 1.0,
            other_lt_liabilities: 2.0,
            deferred_lt_liabilities: 7.0,
            minority_interest: 3.0,
            ..BalanceSheet::default()
        };
        assert_approx(sheet.net_debt(), 2.0);
    }

    #[test]
    fn net_debt_ignores_other_liabilities_by_default() {
        let sheet = filing_balance_sheet();
        assert_approx(sheet.net_debt(), 600.0 - 1000.0 - 1000.0);
    }

    #[test]
    fn date_round_trips_through_json() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 1).expect("valid date");
        let sheet = filing_balance_sheet().with_date(date);
        let json = serde_json::to_string(&sheet).expect("serialize");
        let back: BalanceSheet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.date, Some(date));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = serde_json::from_str::<BalanceSheet>(r#"{ "date": "20150101" }"#)
            .expect_err("not an ISO date");
        assert!(err.is_data());
    }
}
