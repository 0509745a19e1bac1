mod balance_sheet;
mod cash_flows;
mod income_statement;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DcfError, Result};

pub use balance_sheet::BalanceSheet;
pub use cash_flows::CashFlows;
pub use income_statement::{IncomeStatement, ReportingPeriod};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementKind {
    BalanceSheet,
    CashFlows,
    IncomeStatement,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatementKind::BalanceSheet => "balance sheet",
            StatementKind::CashFlows => "cash flow statement",
            StatementKind::IncomeStatement => "income statement",
        };
        f.write_str(label)
    }
}

/// Any one of the statements a company is built from, tagged by `kind` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Statement {
    BalanceSheet(BalanceSheet),
    CashFlows(CashFlows),
    IncomeStatement(IncomeStatement),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::BalanceSheet(_) => StatementKind::BalanceSheet,
            Statement::CashFlows(_) => StatementKind::CashFlows,
            Statement::IncomeStatement(_) => StatementKind::IncomeStatement,
        }
    }

    fn mismatch(&self, expected: StatementKind) -> DcfError {
        DcfError::StatementKind {
            expected,
            found: self.kind(),
        }
    }

    fn into_balance_sheet(self) -> Result<BalanceSheet> {
        match self {
            Statement::BalanceSheet(sheet) => Ok(sheet),
            other => Err(other.mismatch(StatementKind::BalanceSheet)),
        }
    }

    fn into_cash_flows(self) -> Result<CashFlows> {
        match self {
            Statement::CashFlows(flows) => Ok(flows),
            other => Err(other.mismatch(StatementKind::CashFlows)),
        }
    }

    fn into_income_statement(self) -> Result<IncomeStatement> {
        match self {
            Statement::IncomeStatement(statement) => Ok(statement),
            other => Err(other.mismatch(StatementKind::IncomeStatement)),
        }
    }
}

/// A company's most recent statements plus its share data.
///
/// Read-only once built; `with_*` methods return a new company.
#[derive(Clone, Debug, PartialEq)]
pub struct Company {
    fully_diluted_shares: f64,
    price_per_share: f64,
    balance_sheet: BalanceSheet,
    cash_flows: CashFlows,
    income_statement: IncomeStatement,
}

impl Company {
    pub fn new(
        fully_diluted_shares: f64,
        price_per_share: f64,
        balance_sheet: BalanceSheet,
        cash_flows: CashFlows,
        income_statement: IncomeStatement,
    ) -> Self {
        Self {
            fully_diluted_shares,
            price_per_share,
            balance_sheet,
            cash_flows,
            income_statement,
        }
    }

    /// Builds a company from untyped statements, checking each lands in the
    /// slot of its own kind.
    pub fn from_statements(
        fully_diluted_shares: f64,
        price_per_share: f64,
        balance_sheet: Statement,
        cash_flows: Statement,
        income_statement: Statement,
    ) -> Result<Self> {
        Ok(Self::new(
            fully_diluted_shares,
            price_per_share,
            balance_sheet.into_balance_sheet()?,
            cash_flows.into_cash_flows()?,
            income_statement.into_income_statement()?,
        ))
    }

    /// Replaces the statement in `slot`.
    pub fn with_statement(&self, slot: StatementKind, statement: Statement) -> Result<Self> {
        let mut next = self.clone();
        match slot {
            StatementKind::BalanceSheet => next.balance_sheet = statement.into_balance_sheet()?,
            StatementKind::CashFlows => next.cash_flows = statement.into_cash_flows()?,
            StatementKind::IncomeStatement => {
                next.income_statement = statement.into_income_statement()?
            }
        }
        Ok(next)
    }

    pub fn with_price_per_share(&self, price_per_share: f64) -> Self {
        Self {
            price_per_share,
            ..self.clone()
        }
    }

    pub fn with_fully_diluted_shares(&self, fully_diluted_shares: f64) -> Self {
        Self {
            fully_diluted_shares,
            ..self.clone()
        }
    }

    pub fn fully_diluted_shares(&self) -> f64 {
        self.fully_diluted_shares
    }

    pub fn price_per_share(&self) -> f64 {
        self.price_per_share
    }

    pub fn balance_sheet(&self) -> &BalanceSheet {
        &self.balance_sheet
    }

    pub fn cash_flows(&self) -> &CashFlows {
        &self.cash_flows
    }

    pub fn income_statement(&self) -> &IncomeStatement {
        &self.income_statement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_company() -> Company {
        Company::new(
            10.0,
            5.75,
            BalanceSheet {
                cash: 40.0,
                ppe: 60.0,
                accounts_payable: 50.0,
                ..BalanceSheet::default()
            },
            CashFlows { capex: 3.0 },
            IncomeStatement {
                sales: 100.0,
                cogs: 50.0,
                sga: 25.0,
                depreciation: 4.0,
                amortization: 2.0,
                nonrecurring_cost: 3.0,
                tax: 4.0,
                ..IncomeStatement::default()
            },
        )
    }

    #[test]
    fn accessors_return_construction_values() {
        let company = sample_company();
        assert_eq!(company.fully_diluted_shares(), 10.0);
        assert_eq!(company.price_per_share(), 5.75);
        assert_eq!(company.cash_flows().capex, 3.0);
        assert_eq!(company.income_statement().sales, 100.0);
        assert_eq!(company.balance_sheet().assets(), 100.0);
    }

    #[test]
    fn from_statements_places_each_kind() {
        let base = sample_company();
        let company = Company::from_statements(
            10.0,
            5.75,
            Statement::BalanceSheet(base.balance_sheet().clone()),
            Statement::CashFlows(base.cash_flows().clone()),
            Statement::IncomeStatement(base.income_statement().clone()),
        )
        .expect("statements in matching slots");
        assert_eq!(company, base);
    }

    #[test]
    fn from_statements_rejects_swapped_slots() {
        let base = sample_company();
        let err = Company::from_statements(
            10.0,
            5.75,
            Statement::IncomeStatement(base.income_statement().clone()),
            Statement::CashFlows(base.cash_flows().clone()),
            Statement::BalanceSheet(base.balance_sheet().clone()),
        )
        .expect_err("income statement in balance sheet slot");
        assert_eq!(
            err,
            DcfError::StatementKind {
                expected: StatementKind::BalanceSheet,
                found: StatementKind::IncomeStatement,
            }
        );
    }

    #[test]
    fn with_statement_replaces_matching_slot_only() {
        let company = sample_company();
        let updated = company
            .with_statement(
                StatementKind::CashFlows,
                Statement::CashFlows(CashFlows { capex: 300.0 }),
            )
            .expect("cash flows slot");
        assert_eq!(updated.cash_flows().capex, 300.0);
        assert_eq!(company.cash_flows().capex, 3.0);
        assert_eq!(updated.income_statement(), company.income_statement());
    }

    #[test]
    fn with_statement_rejects_wrong_kind() {
        let company = sample_company();
        for (slot, statement) in [
            (
                StatementKind::CashFlows,
                Statement::IncomeStatement(IncomeStatement::default()),
            ),
            (
                StatementKind::CashFlows,
                Statement::BalanceSheet(BalanceSheet::default()),
            ),
            (
                StatementKind::IncomeStatement,
                Statement::CashFlows(CashFlows::default()),
            ),
            (
                StatementKind::BalanceSheet,
                Statement::IncomeStatement(IncomeStatement::default()),
            ),
        ] {
            let found = statement.kind();
            let err = company
                .with_statement(slot, statement)
                .expect_err("mismatched slot");
            assert_eq!(
                err,
                DcfError::StatementKind {
                    expected: slot,
                    found
                }
            );
        }
    }

    #[test]
    fn share_data_updates_return_new_company() {
        let company = sample_company();
        let repriced = company.with_price_per_share(100.0);
        let diluted = company.with_fully_diluted_shares(1000.0);
        assert_eq!(repriced.price_per_share(), 100.0);
        assert_eq!(diluted.fully_diluted_shares(), 1000.0);
        assert_eq!(company.price_per_share(), 5.75);
    }

    #[test]
    fn statement_documents_are_tagged_by_kind() {
        let json = r#"{ "kind": "cash-flows", "capex": 30 }"#;
        let statement: Statement = serde_json::from_str(json).expect("tagged statement");
        assert_eq!(statement, Statement::CashFlows(CashFlows { capex: 30.0 }));
        assert_eq!(statement.kind().to_string(), "cash flow statement");
    }
}
