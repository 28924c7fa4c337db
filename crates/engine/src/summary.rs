//! Read models for the overview screen and the ledger audit.

use crate::{Asset, ExpenseCategory, IncomeSource, Money};

/// Snapshot of a user's finances for the current month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub assets: Vec<Asset>,
    pub incomes: Vec<IncomeSummary>,
    pub expenses: Vec<ExpenseSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeSummary {
    pub income_source: IncomeSource,
    /// Sum of this month's transactions.
    pub month_total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseSummary {
    pub expense_category: ExpenseCategory,
    pub month_total: Money,
}

impl ExpenseSummary {
    pub fn over_limit(&self) -> bool {
        self.expense_category
            .monthly_limit
            .is_some_and(|limit| self.month_total > limit)
    }
}

/// Comparison between the stored balance of an asset and its transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerAudit {
    pub recorded: Money,
    pub opening: Money,
    pub income_total: Money,
    pub expense_total: Money,
    /// `opening + income_total - expense_total`.
    pub expected: Money,
}

impl LedgerAudit {
    pub fn is_consistent(&self) -> bool {
        self.recorded == self.expected
    }
}
